use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Shallow-merges the serialized `patch` over `current`: every top-level
/// field present in the patch replaces the one in `current`, everything
/// else is kept.
pub fn shallow_merge<T, P>(current: &T, patch: &P) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
    P: Serialize,
{
    let mut merged = serde_json::to_value(current)?;
    if let (Value::Object(target), Value::Object(fields)) = (&mut merged, serde_json::to_value(patch)?)
    {
        target.extend(fields);
    }
    serde_json::from_value(merged)
}
