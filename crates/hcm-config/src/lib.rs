pub mod error;

pub use error::*;

use hcm_cloud::PollerOptions;
use hcm_sync::SyncOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_PATH_ENV: &str = "HCM_CONFIG_PATH";
const CANDIDATES: [&str; 4] = ["hcm.local.yaml", ".hcm.local.yaml", "hcm.yaml", ".hcm.yaml"];

/// ポーラーとシンカーの設定
///
/// すべての項目は省略可能。省略されたセクション・キーはデフォルト値になる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    #[serde(default)]
    pub poller: PollerOptions,

    #[serde(default)]
    pub sync: SyncOptions,
}

impl ConsistencyConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // 空ドキュメントは空マップではなく unit として扱われる
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content).map_err(|e| match e {
            ConfigError::Parse(source) => ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "Loaded consistency config");
        Ok(config)
    }

    /// [`find_config_file`] で見つかったファイルを読み込む（見つからなければデフォルト）
    pub fn discover() -> Result<Self> {
        match find_config_file() {
            Ok(path) => Self::load(path),
            Err(ConfigError::ConfigFileNotFound) => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }
}

/// HCMの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("hcm");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 HCM_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: hcm.local.yaml, .hcm.local.yaml, hcm.yaml, .hcm.yaml
/// 3. ./.hcm/ ディレクトリ内: 同様の順序
/// 4. ~/.config/hcm/hcm.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    if let Some(path) = first_existing(&current_dir) {
        return Ok(path);
    }

    // 3. ./.hcm/ ディレクトリで検索
    let hcm_dir = current_dir.join(".hcm");
    if hcm_dir.is_dir() {
        if let Some(path) = first_existing(&hcm_dir) {
            return Ok(path);
        }
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("hcm").join("hcm.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("hcm"));
        assert!(config_dir.exists());
    }

    #[test]
    fn test_parse_full_config() {
        let config = ConsistencyConfig::from_yaml_str(
            r#"
poller:
  interval_ms: 2000
  max_attempts: 300
  abort_on_error: true
sync:
  max_pages: 10000
  sweep_orphans: false
"#,
        )
        .unwrap();

        assert_eq!(config.poller.interval(), Duration::from_secs(2));
        assert_eq!(config.poller.max_attempts, Some(300));
        assert!(config.poller.abort_on_error);
        assert_eq!(config.sync.max_pages, Some(10000));
        assert!(!config.sync.sweep_orphans);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = ConsistencyConfig::from_yaml_str("poller:\n  max_attempts: 5\n").unwrap();

        assert_eq!(config.poller.interval_ms, 1000);
        assert_eq!(config.poller.max_attempts, Some(5));
        assert_eq!(config.sync, SyncOptions::default());
        assert_eq!(
            ConsistencyConfig::from_yaml_str("").unwrap(),
            ConsistencyConfig::default()
        );
    }

    #[test]
    fn test_load_reports_path_on_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("hcm.yaml");
        fs::write(&path, "poller:\n  interval_ms: soon\n").unwrap();

        let err = ConsistencyConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("解析に失敗しました"));
        match err {
            ConfigError::Yaml { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("Yaml エラーを期待したが {other}"),
        }
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("hcm.yaml"), "# test").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("hcm.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("hcm.yaml"), "# global").unwrap();
        fs::write(temp_dir.path().join("hcm.local.yaml"), "# local").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        // hcm.local.yaml が優先される
        assert!(result.unwrap().ends_with("hcm.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_hcm_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let hcm_dir = temp_dir.path().join(".hcm");
        fs::create_dir(&hcm_dir).unwrap();
        fs::write(hcm_dir.join("hcm.yaml"), "# in hcm dir").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with(".hcm/hcm.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "poller:\n  interval_ms: 50\n").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        }

        let found = find_config_file();
        let discovered = ConsistencyConfig::discover();

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }

        assert_eq!(found.unwrap(), config_path);
        assert_eq!(discovered.unwrap().poller.interval_ms, 50);
    }

    #[test]
    #[serial]
    fn test_discover_without_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        let discovered = ConsistencyConfig::discover();
        std::env::set_current_dir(original_dir).unwrap();

        // 開発マシンには ~/.config/hcm/hcm.yaml が存在する場合がある
        if let Err(ConfigError::ConfigFileNotFound) = result {
            assert_eq!(discovered.unwrap(), ConsistencyConfig::default());
        }
    }
}
