//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// `Ok(None)` when the key is absent, `Err(raw)` when its value is not a boolean.
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String>;
}
