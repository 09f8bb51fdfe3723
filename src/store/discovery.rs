//! 言語ファイルの探索

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use super::StoreError;
use crate::config::StoreSettings;

/// 見つかった言語ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LanguageFile {
    /// 言語コード（拡張子を除いたファイル名）
    pub(crate) code: String,
    /// ファイルのフルパス
    pub(crate) path: PathBuf,
}

/// `directory` 以下の言語ファイルを探す
///
/// サブディレクトリも走査する。隠しファイルは除外するので、設定ファイルは結果に含まれない。
/// `.gitignore` などの ignore ファイルは参照しない。
/// 結果はパス順に並ぶ。
pub(crate) fn find_language_files(
    directory: &Path,
    settings: &StoreSettings,
) -> Result<Vec<LanguageFile>, StoreError> {
    let include_set = build_glob_set(std::slice::from_ref(&settings.translation_files.file_pattern))?;
    let exclude_set = build_glob_set(&settings.exclude_patterns)?;

    let mut found_files = Vec::new();
    for result in WalkBuilder::new(directory)
        .hidden(true)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(directory) else {
            continue;
        };
        if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
            continue;
        }

        let Some(code) = path.file_stem().and_then(|stem| stem.to_str()) else {
            tracing::warn!(path = %path.display(), "Skipping document with a non UTF-8 name");
            continue;
        };

        found_files.push(LanguageFile { code: code.to_string(), path: path.to_path_buf() });
    }

    tracing::debug!(directory = %directory.display(), count = found_files.len(), "Discovered language documents");
    Ok(found_files)
}

/// `patterns` を 1 つの `GlobSet` にまとめる
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, StoreError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
