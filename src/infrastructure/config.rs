use crate::domain::view_config::DomainConfig;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub views_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Defaults, then `config/app.*`, then `DASHBOARD__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("upstream.base_url", "http://localhost:3000")?
        .set_default("upstream.timeout_secs", 30)?
        .set_default("views_dir", "config/views")?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Parse and validate one view definition.
pub fn parse_view_config(source: &str) -> anyhow::Result<DomainConfig> {
    let config: DomainConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

/// Load every `*.toml` view in `dir`, sorted by file name.
pub fn load_view_configs(dir: impl AsRef<Path>) -> anyhow::Result<Vec<DomainConfig>> {
    let dir = dir.as_ref();
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read views directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut seen = HashSet::new();
    let mut views = Vec::with_capacity(paths.len());
    for path in paths {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let view = parse_view_config(&source)
            .with_context(|| format!("Invalid view config {}", path.display()))?;
        if !seen.insert(view.id.clone()) {
            anyhow::bail!("Duplicate view id {} in {}", view.id, path.display());
        }
        views.push(view);
    }

    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES_VIEW: &str = r#"
        id = "sales"
        title = "Sales"
        api_endpoint = "/api/sales"
        metric_key = "units"
        branches = ["Pune", "Nashik"]
        start_year = 2021
        fiscal_start_month = "jan"

        [extra_dimension]
        key = "model"
        allowed_values = ["SWIFT", "BALENO"]
    "#;

    #[test]
    fn test_parse_view_config() {
        let view = parse_view_config(SALES_VIEW).unwrap();
        assert_eq!(view.id, "sales");
        assert_eq!(view.fiscal_months()[0], "JAN");
        assert_eq!(view.extra_key(), Some("model"));
    }

    #[test]
    fn test_parse_view_config_rejects_empty_branches() {
        let source = SALES_VIEW.replace(r#"["Pune", "Nashik"]"#, "[]");
        let err = parse_view_config(&source).unwrap_err();
        assert!(err.to_string().contains("no branches"));
    }

    #[test]
    fn test_load_view_configs_rejects_duplicate_ids() {
        let dir = std::env::temp_dir().join(format!("branch-dashboard-views-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.toml"), SALES_VIEW).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let views = load_view_configs(&dir).unwrap();
        assert_eq!(views.len(), 1);

        std::fs::write(dir.join("b.toml"), SALES_VIEW).unwrap();
        let err = load_view_configs(&dir).unwrap_err();
        assert!(err.to_string().contains("Duplicate view id sales"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
