use crate::annotations::{Annotation, EntityMetadata};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::env;
use std::path::PathBuf;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds entity metadata from string and numeric key/value pairs.
///
/// # Arguments
///
/// * `strings` - String annotations as key/value pairs.
/// * `numerics` - Numeric annotations as key/value pairs.
pub fn make_metadata(strings: Vec<(&str, &str)>, numerics: Vec<(&str, i64)>) -> EntityMetadata {
    let mut metadata = EntityMetadata::default();
    for (key, value) in strings {
        metadata
            .string_annotations
            .push(Annotation::new(key, value.to_string()));
    }
    for (key, value) in numerics {
        metadata.numeric_annotations.push(Annotation::new(key, value));
    }
    metadata
}

pub fn get_random_byte_vec(n: usize) -> Vec<u8> {
    let random_bytes: Vec<u8> = (0..n).map(|_| rand::random::<u8>()).collect();
    random_bytes
}

pub fn gen_rand_string(n: usize) -> String {
    thread_rng()
        .sample_iter(Alphanumeric)
        .take(n)
        .map(char::from)
        .collect()
}

pub fn gen_random_dir() -> PathBuf {
    init();
    let mut dir = env::temp_dir();
    dir.push(String::from("annsql"));
    let rand_string = gen_rand_string(10);
    dir.push(rand_string);
    dir
}
