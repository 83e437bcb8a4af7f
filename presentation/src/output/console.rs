//! Console output for the luabot host

use colored::Colorize;
use luabot_domain::BotMode;
use std::path::{Path, PathBuf};

/// Startup facts shown in the banner.
#[derive(Debug, Clone)]
pub struct BannerInfo {
    pub version: String,
    pub lua_version: String,
    pub team_name: String,
    pub team_number: i32,
    pub search_dir: Option<PathBuf>,
    pub period_ms: i32,
}

/// What happened during one mode activation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: BotMode,
    pub program: Option<String>,
    pub ticks: u64,
    pub all_stop_ticks: u64,
    pub error: Option<String>,
    pub shooter: String,
    pub drive: (f64, f64),
    pub shooter_volts: (f64, f64),
}

/// Formats host output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn banner(info: &BannerInfo) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&format!("luabot {}", info.version)));
        output.push('\n');

        let team = if info.team_name.is_empty() {
            "(unnamed)".to_string()
        } else {
            info.team_name.clone()
        };
        output.push_str(&format!(
            "{} {} #{}\n",
            "Team:".cyan().bold(),
            team,
            info.team_number
        ));
        output.push_str(&format!("{} {}\n", "Runtime:".cyan().bold(), info.lua_version));
        output.push_str(&format!(
            "{} {}\n",
            "Scripts:".cyan().bold(),
            info.search_dir
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        ));
        output.push_str(&format!("{} {} ms\n", "Period:".cyan().bold(), info.period_ms));
        output
    }

    pub fn summary(summary: &RunSummary) -> String {
        let mut output = Self::section_header(&format!("{} summary", summary.mode));

        output.push_str(&format!(
            "{} {}\n",
            "Program:".cyan().bold(),
            summary.program.as_deref().unwrap_or("(none)")
        ));

        let scripted = summary.ticks.saturating_sub(summary.all_stop_ticks);
        output.push_str(&format!(
            "{} {} ({} scripted, {} all-stop)\n",
            "Ticks:".cyan().bold(),
            summary.ticks,
            scripted,
            summary.all_stop_ticks
        ));

        output.push_str(&format!(
            "{} speed={:.2} rotation={:.2}\n",
            "Drive:".cyan().bold(),
            summary.drive.0,
            summary.drive.1
        ));
        output.push_str(&format!(
            "{} {} (primary {:.1} V, secondary {:.1} V)\n",
            "Shooter:".cyan().bold(),
            summary.shooter,
            summary.shooter_volts.0,
            summary.shooter_volts.1
        ));

        match &summary.error {
            Some(err) => output.push_str(&format!(
                "{} {}\n",
                "Script error:".red().bold(),
                Self::indent(err, "  ").trim_start()
            )),
            None => output.push_str(&format!("{}\n", "No script errors".green())),
        }

        output.push_str(&Self::footer());
        output
    }

    pub fn program_list(dir: Option<&Path>, programs: &[String]) -> String {
        let mut output = Self::section_header("Bot programs");
        if let Some(dir) = dir {
            output.push_str(&format!("{}\n", dir.display().to_string().dimmed()));
        }
        if programs.is_empty() {
            output.push_str("  (none found)\n");
        }
        for program in programs {
            output.push_str(&format!("  * {}\n", program));
        }
        output
    }

    /// `(label, path, exists)` rows, in priority order.
    pub fn config_sources(sources: &[(String, PathBuf, bool)]) -> String {
        let mut output = String::from("Configuration sources (in priority order):\n");
        output.push_str("  [     ] Env:     LUABOT_<SECTION>__<KEY>\n");
        for (label, path, found) in sources {
            let mark = if *found { "FOUND" } else { "     " };
            output.push_str(&format!(
                "  [{}] {:<8} {}\n",
                mark,
                format!("{}:", label),
                path.display()
            ));
        }
        output.push_str("  [     ] Default: built-in defaults\n");
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_banner_shows_team() {
        plain();
        let banner = ConsoleFormatter::banner(&BannerInfo {
            version: "0.4.0".into(),
            lua_version: "Lua 5.4".into(),
            team_name: "The Gold Standard".into(),
            team_number: 9431,
            search_dir: Some(PathBuf::from("/deploy")),
            period_ms: 20,
        });
        assert!(banner.contains("The Gold Standard #9431"));
        assert!(banner.contains("Lua 5.4"));
        assert!(banner.contains("/deploy"));
    }

    #[test]
    fn test_summary_reports_errors() {
        plain();
        let summary = ConsoleFormatter::summary(&RunSummary {
            mode: BotMode::Teleop,
            program: Some("teleop.bot".into()),
            ticks: 10,
            all_stop_ticks: 4,
            error: Some("teleop.bot:3: boom".into()),
            shooter: "idle...".into(),
            drive: (0.0, 0.0),
            shooter_volts: (0.0, 0.0),
        });
        assert!(summary.contains("teleop summary"));
        assert!(summary.contains("10 (6 scripted, 4 all-stop)"));
        assert!(summary.contains("teleop.bot:3: boom"));
    }

    #[test]
    fn test_program_list() {
        plain();
        let list = ConsoleFormatter::program_list(None, &["a.bot".into(), "b.bot".into()]);
        assert!(list.contains("  * a.bot\n  * b.bot"));
        assert!(ConsoleFormatter::program_list(None, &[]).contains("(none found)"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
