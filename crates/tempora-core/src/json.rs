use crate::error::{AppError, AppResult};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub fn canonical_json_bytes<T: Serialize>(value: &T) -> AppResult<Vec<u8>> {
    let mut json_value = serde_json::to_value(value)
        .map_err(|e| AppError::internal(format!("json serialize error: {e}")))?;
    sort_keys(&mut json_value);
    serde_json::to_vec(&json_value)
        .map_err(|e| AppError::internal(format!("json encode error: {e}")))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hashes `value` with `field` blanked out, so the hash can be stored in that field.
pub fn determinism_hash<T: Serialize>(value: &T, field: &str) -> AppResult<String> {
    let mut json_value = serde_json::to_value(value)
        .map_err(|e| AppError::internal(format!("json serialize error: {e}")))?;
    let obj = json_value
        .as_object_mut()
        .ok_or_else(|| AppError::internal("determinism hash value must be an object"))?;
    obj.insert(field.to_string(), Value::String(String::new()));
    let bytes = canonical_json_bytes(&json_value)?;
    Ok(sha256_hex(&bytes))
}

fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(mut v) = map.remove(&key) {
                    sort_keys(&mut v);
                    sorted.insert(key, v);
                }
            }
            *map = sorted;
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}
