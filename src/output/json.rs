use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReadinessBand;

    #[test]
    fn renders_pretty_json() {
        let band = ReadinessBand::EarlyStage;
        assert_eq!(render_json(&band).unwrap(), "\"early_stage\"");
        let pretty = render_json(&serde_json::json!({"ok": true})).unwrap();
        assert!(pretty.contains('\n'));
    }
}
