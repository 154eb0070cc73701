//! ロギングシステム
//!
//! `log` ファサードの出力先をファイルに限定したロガーを提供
//! rawモード中の端末に書き込むと入力行が崩れるため、stderrには出力しない

use crate::error::{InputError, Result};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// ログ出力先を指定する環境変数
pub const LOG_ENV_VAR: &str = "INPLACE_INPUT_LOG";

/// ファイル出力ロガー
#[derive(Debug)]
pub struct FileLogger {
    level: LevelFilter,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogger {
    /// 追記モードでファイルを開いてロガーを作成
    pub fn open<P: AsRef<Path>>(path: P, level: LevelFilter) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            level,
            path,
            file: Mutex::new(file),
        })
    }

    /// ログレベルを取得
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// 出力先パスを取得
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_line(record: &Record<'_>) -> String {
        format!(
            "{} [{}] {}",
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", Self::format_line(record));
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// グローバルロガーとして登録
pub fn init<P: AsRef<Path>>(path: P, level: LevelFilter) -> Result<()> {
    let logger = FileLogger::open(path, level)?;
    log::set_boxed_logger(Box::new(logger)).map_err(|e| InputError::Io {
        message: format!("logger already installed: {}", e),
    })?;
    log::set_max_level(level);
    Ok(())
}

/// 環境変数が設定されていればロガーを登録
pub fn init_from_env(level: LevelFilter) -> Result<bool> {
    match std::env::var_os(LOG_ENV_VAR) {
        Some(path) if !path.is_empty() => {
            init(PathBuf::from(path), level)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
