use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: hcm.local.yaml, .hcm.local.yaml, hcm.yaml, .hcm.yaml\n\
        - ./.hcm/ ディレクトリ\n\
        - ~/.config/hcm/hcm.yaml\n\
        または HCM_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("設定の解析に失敗しました: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("設定ファイル {} の解析に失敗しました: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
