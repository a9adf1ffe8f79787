//! ll-cli list 输出解析

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// 表头行中出现的列名
const HEADER_TOKENS: &[&str] = &["ID", "名称"];

/// 已安装应用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub app_id: String,
    pub arch: String,
    pub version: String,
}

/// 单行解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineVerdict {
    App(InstalledApp),
    Skipped(SkipReason),
}

/// 行被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Header,
    /// 行首不是应用 ID
    NoAppId,
    /// 有应用 ID 但找不到版本号
    NoVersion,
}

fn app_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9.-]+").expect("valid app id pattern"))
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d+\.\d+[\d.]*)\b").expect("valid version pattern"))
}

fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ansi pattern"))
}

/// 清理终端输出中的 ANSI 转义序列和控制字符
pub fn strip_ansi(input: &str) -> String {
    ansi_pattern()
        .replace_all(input, "")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// 解析一行 ll-cli list 输出（需已去除 ANSI 序列）
pub fn parse_installed_line(line: &str, arch: &str) -> LineVerdict {
    if line.trim().is_empty() {
        return LineVerdict::Skipped(SkipReason::Blank);
    }
    if HEADER_TOKENS.iter().any(|token| line.contains(token)) {
        return LineVerdict::Skipped(SkipReason::Header);
    }
    let Some(id_match) = app_id_pattern().find(line) else {
        return LineVerdict::Skipped(SkipReason::NoAppId);
    };
    let rest = &line[id_match.end()..];
    let Some(version) = version_pattern().captures(rest).and_then(|c| c.get(1)) else {
        return LineVerdict::Skipped(SkipReason::NoVersion);
    };

    LineVerdict::App(InstalledApp {
        app_id: id_match.as_str().to_string(),
        arch: arch.to_string(),
        version: version.as_str().to_string(),
    })
}

/// 提取已安装应用列表。
///
/// 不完整的行不会报错，只在 debug 日志中记录后丢弃。
pub fn extract_records(raw: &str, arch: &str) -> Vec<InstalledApp> {
    let cleaned = strip_ansi(raw);
    let mut apps = Vec::new();

    for (idx, line) in cleaned.lines().enumerate() {
        match parse_installed_line(line, arch) {
            LineVerdict::App(app) => apps.push(app),
            LineVerdict::Skipped(SkipReason::Blank) => {}
            LineVerdict::Skipped(reason) => {
                log::debug!("跳过第 {} 行 ({:?}): {}", idx + 1, reason, line.trim());
            }
        }
    }

    apps
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\x1b[1mID                          名称         版本          渠道   模块    描述\x1b[0m
cn.wps.wps-office           WPS Office   11.1.0.11719  main   binary  办公套件
org.deepin.runtime.dtk      dtk          23.1.0.2      main   binary  runtime
\x1b[32mcom.qq.wechat\x1b[0m               微信         4.0.0.21      main   binary  聊天

org.example.broken          broken       latest        main   binary
";

    fn verdict(line: &str) -> LineVerdict {
        parse_installed_line(line, "x86_64")
    }

    #[test]
    fn parses_simple_row() {
        assert_eq!(
            verdict("com.example.app     1.2.3   info"),
            LineVerdict::App(InstalledApp {
                app_id: "com.example.app".into(),
                arch: "x86_64".into(),
                version: "1.2.3".into(),
            })
        );
    }

    #[test]
    fn reports_why_lines_are_dropped() {
        assert_eq!(verdict("   "), LineVerdict::Skipped(SkipReason::Blank));
        assert_eq!(verdict(""), LineVerdict::Skipped(SkipReason::Blank));
        assert_eq!(
            verdict("app.id  名称  1.0.0"),
            LineVerdict::Skipped(SkipReason::Header)
        );
        assert_eq!(
            verdict("com.example.app  ID  1.2.3"),
            LineVerdict::Skipped(SkipReason::Header)
        );
        assert_eq!(
            verdict("Com.Upper.app  1.2.3"),
            LineVerdict::Skipped(SkipReason::NoAppId)
        );
        assert_eq!(
            verdict("  com.indented.app  1.2.3"),
            LineVerdict::Skipped(SkipReason::NoAppId)
        );
        assert_eq!(
            verdict("com.example.app  latest  stable"),
            LineVerdict::Skipped(SkipReason::NoVersion)
        );
        assert_eq!(verdict("com.example.app 12"), LineVerdict::Skipped(SkipReason::NoVersion));
    }

    #[test]
    fn version_is_searched_after_the_id() {
        match verdict("org.kde.qt5.15   5.15.2.1   main") {
            LineVerdict::App(app) => {
                assert_eq!(app.app_id, "org.kde.qt5.15");
                assert_eq!(app.version, "5.15.2.1");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn strips_ansi_sequences() {
        assert_eq!(strip_ansi("\x1b[1;32mgreen\x1b[0m text\r"), "green text");
        assert_eq!(strip_ansi("plain\tline\n"), "plain\tline\n");
    }

    #[test]
    fn unterminated_escape_keeps_following_text() {
        assert_eq!(strip_ansi("\x1b[微信 4.0.0.21 main"), "[微信 4.0.0.21 main");
        assert_eq!(strip_ansi("a\x1b[1mb\x1b[c"), "ab");
        assert_eq!(strip_ansi("\x1b[?25lhidden"), "hidden");
    }

    #[test]
    fn extracts_records_from_listing() {
        let apps = extract_records(SAMPLE, "arm64");
        let ids: Vec<_> = apps.iter().map(|a| a.app_id.as_str()).collect();
        assert_eq!(ids, vec!["cn.wps.wps-office", "org.deepin.runtime.dtk", "com.qq.wechat"]);
        assert_eq!(apps[0].version, "11.1.0.11719");
        assert_eq!(apps[2].version, "4.0.0.21");
        assert!(apps.iter().all(|a| a.arch == "arm64"));
    }

    #[test]
    fn installed_app_serializes_for_check_request() {
        let app = InstalledApp {
            app_id: "a".into(),
            arch: "x86_64".into(),
            version: "1.0".into(),
        };
        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            serde_json::json!({"appId": "a", "arch": "x86_64", "version": "1.0"})
        );
    }
}
