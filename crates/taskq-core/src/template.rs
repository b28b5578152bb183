//! Notification text templates.
//!
//! A template is plain text with `$name` placeholders filled from a finished
//! job. Unknown placeholders are left as written.

use chrono::Local;
use std::path::Path;

use crate::job::{non_empty, JobInfo, UploadResult};

/// Placeholder names, longest first so `$filenamenoext` wins over `$filename`.
const PLACEHOLDERS: &[&str] = &[
    "thumbnailurl",
    "filenamenoext",
    "deletionurl",
    "folderpath",
    "foldername",
    "uploadtime",
    "shorturl",
    "filepath",
    "filename",
    "result",
    "url",
];

/// Expand every placeholder in `format` using `info`.
pub fn render(format: &str, info: &JobInfo) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        match PLACEHOLDERS.iter().find(|name| tail.starts_with(*name)) {
            Some(name) => {
                out.push_str(&value(name, info));
                rest = &tail[name.len()..];
            }
            None => {
                out.push('$');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn value(name: &str, info: &JobInfo) -> String {
    let result = info.result.as_ref();
    let path = info.file_path.as_deref();

    match name {
        "result" => info.result_text(),
        "url" => url_field(result, |r| &r.url),
        "shorturl" => url_field(result, |r| &r.shortened_url),
        "thumbnailurl" => url_field(result, |r| &r.thumbnail_url),
        "deletionurl" => url_field(result, |r| &r.deletion_url),
        "filepath" => path.map(|p| p.display().to_string()).unwrap_or_default(),
        "filename" => file_name(path).unwrap_or_else(|| info.file_name.clone()),
        "filenamenoext" => path
            .or_else(|| Some(Path::new(&info.file_name)))
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        "folderpath" => path
            .and_then(Path::parent)
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        "foldername" => path
            .and_then(Path::parent)
            .and_then(|p| file_name(Some(p)))
            .unwrap_or_default(),
        "uploadtime" => info
            .finished_at
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn url_field(result: Option<&UploadResult>, pick: impl Fn(&UploadResult) -> &Option<String>) -> String {
    result
        .and_then(|r| non_empty(pick(r)))
        .unwrap_or_default()
        .to_string()
}

fn file_name(path: Option<&Path>) -> Option<String> {
    path?.file_name().map(|s| s.to_string_lossy().into_owned())
}
