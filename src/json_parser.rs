/*

    Provide utilities to parse query workloads from JSON.

    The parser is somewhat robust, let <a> be integer or float type,
    in JSON file <a> can be given both in quotes (string) or as is.

    e.g. In JSON file both
    "MaxTrianglesPerLeaf": "6" and "MaxTrianglesPerLeaf": 6
    works as max_triangles_per_leaf: usize in source code

    Vector3 fields accept both "<a> <a> <a>" and [a, a, a].

    @date: 2 Oct, 2025
*/

use std::fmt::{self};
use std::marker::PhantomData;
use std::str::FromStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::{self};
use serde::{Deserialize, Deserializer};
use serde::de::{self, Visitor, SeqAccess};

use crate::prelude::*;
use crate::tracer::Workload;

pub fn parse_workload(path: &Path) -> Result<Workload, Box<dyn std::error::Error>> {

    let span = tracing::span!(tracing::Level::INFO, "load_workload");
    let _enter = span.enter();

    // Open file
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    debug!("Reading file from {:?}", path);

    // Parse JSON into Workload
    let workload: Workload = serde_json::from_reader(reader)?;
    workload.tree.validate()?;
    Ok(workload)
}


pub(crate) fn deser_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    /*
        Deserialize usize type given as either string or number in JSON
    */
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| de::Error::custom("Invalid unsigned integer")),
        serde_json::Value::String(s) => s.trim().parse::<usize>()
            .map_err(|_| de::Error::custom("Failed to parse integer from string")),
        t => Err(de::Error::custom(format!("Expected int or string, found {:#?}", t))),
    }
}

// Handles floats as string or number
pub(crate) fn deser_float<'de, D>(deserializer: D) -> Result<Float, D::Error>
where
    D: Deserializer<'de>,
{
    /*
        Deserialize float type given as either string or number in JSON
    */
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_f64()
            .map(|v| v as Float)
            .ok_or_else(|| de::Error::custom("Invalid float")),
        serde_json::Value::String(s) => s.trim().parse::<Float>()
            .map_err(|_| de::Error::custom("Failed to parse float from string")),
        t => Err(de::Error::custom(format!("Expected float or string, found {t}"))),
    }
}

pub(crate) fn deser_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct BoolVisitor;

    impl<'de> serde::de::Visitor<'de> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a boolean or a string containing true/false")
        }

        fn visit_bool<E>(self, v: bool) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            Ok(v)
        }

        fn visit_str<E>(self, v: &str) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            match v.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                "1" => Ok(true),
                "0" => Ok(false),
                _ => Err(E::custom(format!("invalid bool '{}'", v))),
            }
        }

        fn visit_string<E>(self, v: String) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            self.visit_str(&v)
        }

        fn visit_u64<E>(self, v: u64) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            Ok(v != 0)
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}

pub trait From3<T>: Sized {
    fn new(x: T, y: T, z: T) -> Self;
}

impl From3<f64> for bevy_math::DVec3 {
    fn new(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z)
    }
}

pub(crate) fn deser_vec3<'de, D, V, F>(deserializer: D) -> Result<V, D::Error>
where
    D: Deserializer<'de>,
    F: Deserialize<'de> + FromStr,
    F::Err: fmt::Display,
    V: From3<F>,
{
    struct Vec3Visitor<V, F>(PhantomData<(V, F)>);

    impl<'de, V, F> Visitor<'de> for Vec3Visitor<V, F>
    where
        F: Deserialize<'de> + FromStr,
        F::Err: fmt::Display,
        V: From3<F>,
    {
        type Value = V;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a Vec3 as a string 'x y z' or an array [x, y, z]")
        }

        // Given "X Y Z"
        fn visit_str<E>(self, value: &str) -> Result<V, E>
        where
            E: de::Error,
        {
            parse_vec3_str(value).map_err(de::Error::custom)
        }

        // Given [X, Y, Z]
        fn visit_seq<A>(self, mut seq: A) -> Result<V, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let x: F = seq
                .next_element()?
                .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            let y: F = seq
                .next_element()?
                .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            let z: F = seq
                .next_element()?
                .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            if seq.next_element::<F>()?.is_some() {
                return Err(de::Error::custom("Expected only 3 elements in Vec3 array"));
            }
            Ok(V::new(x, y, z))
        }
    }

    deserializer.deserialize_any(Vec3Visitor(PhantomData))
}

fn parse_vec3_str<V, F>(s: &str) -> Result<V, String>
where
    F: FromStr,
    F::Err: fmt::Display,
    V: From3<F>,
{
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(format!("Expected 3 values, got {}", parts.len()));
    }
    let x = parts[0].parse::<F>().map_err(|e| e.to_string())?;
    let y = parts[1].parse::<F>().map_err(|e| e.to_string())?;
    let z = parts[2].parse::<F>().map_err(|e| e.to_string())?;
    Ok(V::new(x, y, z))
}

// Wrapper for deser_vec3 on the crate's Vector3
pub(crate) fn deser_vector3<'de, D>(deserializer: D) -> Result<Vector3, D::Error>
where
    D: Deserializer<'de>,
{
    deser_vec3::<D, Vector3, Float>(deserializer)
}

/// Three corners of a triangle, each in any format deser_vec3 accepts.
pub(crate) fn deser_vec3_array<'de, D>(deserializer: D) -> Result<[Vector3; 3], D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Corner(#[serde(deserialize_with = "deser_vector3")] Vector3);

    let corners: Vec<Corner> = Deserialize::deserialize(deserializer)?;
    match corners.as_slice() {
        [a, b, c] => Ok([a.0, b.0, c.0]),
        _ => Err(de::Error::custom(format!("Expected 3 vertices, got {}", corners.len()))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "deser_usize")]
        count: usize,
        #[serde(deserialize_with = "deser_float")]
        size: Float,
        #[serde(deserialize_with = "deser_bool")]
        flag: bool,
        #[serde(deserialize_with = "deser_vector3")]
        point: Vector3,
    }

    #[test]
    fn test_strings_and_literals() {
        let a: Probe = serde_json::from_str(r#"{ "count": "7", "size": "0.5", "flag": "True", "point": "1 2 3" }"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{ "count": 7, "size": 0.5, "flag": true, "point": [1, 2, 3.0] }"#).unwrap();
        for p in [a, b] {
            assert_eq!(p.count, 7);
            assert_eq!(p.size, 0.5);
            assert!(p.flag);
            assert_eq!(p.point, Vector3::new(1., 2., 3.));
        }
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(serde_json::from_str::<Probe>(r#"{ "count": -1, "size": 1, "flag": 0, "point": "1 2 3" }"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{ "count": 1, "size": 1, "flag": 0, "point": "1 2" }"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{ "count": 1, "size": 1, "flag": "maybe", "point": "1 2 3" }"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{ "count": 1, "size": 1, "flag": 1, "point": [1, 2, 3, 4] }"#).is_err());
    }

    #[test]
    fn test_vec3_array_needs_three_corners() {
        #[derive(Debug, Deserialize)]
        struct Tri {
            #[serde(deserialize_with = "deser_vec3_array")]
            verts: [Vector3; 3],
        }
        let tri: Tri = serde_json::from_str(r#"{ "verts": ["0 0 0", "1 0 0", [0, 1, 0]] }"#).unwrap();
        assert_eq!(tri.verts[2], Vector3::Y);
        assert!(serde_json::from_str::<Tri>(r#"{ "verts": ["0 0 0", "1 0 0"] }"#).is_err());
    }

    #[test]
    fn test_parse_workload_file() {
        let path = std::env::temp_dir().join(format!("kd_tracer_workload_{}.json", std::process::id()));
        std::fs::write(&path, r#"{
            "KDTree": { "MaxTrianglesPerLeaf": "2" },
            "Triangles": [ { "Vertices": ["0 0 1", "1 0 1", "0 1 1"] } ],
            "Rays": [ { "Origin": "0.2 0.2 0", "Direction": "0 0 1" } ]
        }"#).unwrap();

        let workload = parse_workload(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(workload.tree.max_triangles_per_leaf, 2);
        assert_eq!(workload.triangles.len(), 1);
        assert_eq!(workload.rays.len(), 1);
    }

    #[test]
    fn test_parse_workload_rejects_invalid_config() {
        let path = std::env::temp_dir().join(format!("kd_tracer_bad_workload_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "KDTree": { "MaxTrianglesPerLeaf": 0 } }"#).unwrap();
        let result = parse_workload(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
