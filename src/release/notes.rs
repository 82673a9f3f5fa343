//! Release notes

use chrono::NaiveDate;

use super::commits::ConventionalCommit;
use crate::version::ReleaseVersion;

const SECTIONS: [(&str, &str); 3] = [
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance Improvements"),
];

/// Markdown notes for one release, grouped by change type
pub struct ReleaseNotes<'a> {
    pub version: &'a ReleaseVersion,
    pub last_release: Option<&'a ReleaseVersion>,
    pub commits: &'a [ConventionalCommit],
    pub date: NaiveDate,
    /// `owner/name`, used for compare and commit links
    pub repository: Option<&'a str>,
}

impl ReleaseNotes<'_> {
    pub fn render(&self) -> String {
        let mut out = self.heading();

        let breaking: Vec<&ConventionalCommit> =
            self.commits.iter().filter(|c| c.breaking.is_some()).collect();
        if !breaking.is_empty() {
            out.push_str("\n### Breaking Changes\n\n");
            for commit in breaking {
                let note = commit.breaking.as_deref().unwrap_or(&commit.subject);
                out.push_str(&format!("* {}{}\n", scope_prefix(commit), note));
            }
        }

        for (kind, title) in SECTIONS {
            let commits: Vec<&ConventionalCommit> =
                self.commits.iter().filter(|c| c.kind == kind).collect();
            if commits.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {}\n\n", title));
            for commit in commits {
                out.push_str(&format!(
                    "* {}{} ({})\n",
                    scope_prefix(commit),
                    commit.subject,
                    self.commit_link(commit)
                ));
            }
        }
        out
    }

    fn heading(&self) -> String {
        let date = self.date.format("%Y-%m-%d");
        match (self.repository, self.last_release) {
            (Some(repo), Some(last)) => format!(
                "## [{}](https://github.com/{}/compare/{}...{}) ({})\n",
                self.version,
                repo,
                last.tag_string(),
                self.version.tag_string(),
                date
            ),
            _ => format!("## {} ({})\n", self.version, date),
        }
    }

    fn commit_link(&self, commit: &ConventionalCommit) -> String {
        match self.repository {
            Some(repo) => format!(
                "[{}](https://github.com/{}/commit/{})",
                commit.short_id(),
                repo,
                commit.id
            ),
            None => commit.short_id().to_string(),
        }
    }
}

fn scope_prefix(commit: &ConventionalCommit) -> String {
    commit
        .scope
        .as_ref()
        .map(|scope| format!("**{}:** ", scope))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::commits::RawCommit;

    fn commits() -> Vec<ConventionalCommit> {
        [
            ("aaaaaaa1", "feat(display): add DisplayText3D"),
            ("bbbbbbb2", "fix: legend offset"),
            ("ccccccc3", "docs: readme"),
            ("ddddddd4", "feat!: rename Plane.o\n\nBREAKING CHANGE: Plane.o is now origin"),
        ]
        .iter()
        .filter_map(|(id, message)| ConventionalCommit::parse(&RawCommit::new(*id, *message)))
        .collect()
    }

    #[test]
    fn test_notes_grouped_by_type() {
        let version = ReleaseVersion::parse("2.0.0").unwrap();
        let last = ReleaseVersion::parse("1.4.2").unwrap();
        let commits = commits();
        let notes = ReleaseNotes {
            version: &version,
            last_release: Some(&last),
            commits: &commits,
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            repository: Some("ladybug-tools/ladybug-display-schema"),
        }
        .render();

        assert!(notes.starts_with(
            "## [2.0.0](https://github.com/ladybug-tools/ladybug-display-schema/compare/v1.4.2...v2.0.0) (2026-10-19)"
        ));
        let breaking = notes.find("### Breaking Changes").unwrap();
        let features = notes.find("### Features").unwrap();
        let fixes = notes.find("### Bug Fixes").unwrap();
        assert!(breaking < features && features < fixes);
        assert!(notes.contains("* Plane.o is now origin\n"));
        assert!(notes.contains("* **display:** add DisplayText3D ([aaaaaaa]"));
        assert!(!notes.contains("readme"));
        assert!(!notes.contains("Performance Improvements"));
    }

    #[test]
    fn test_notes_without_repository() {
        let version = ReleaseVersion::initial();
        let commits = commits();
        let notes = ReleaseNotes {
            version: &version,
            last_release: None,
            commits: &commits[1..2],
            date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            repository: None,
        }
        .render();
        assert_eq!(notes, "## 1.0.0 (2026-01-02)\n\n### Bug Fixes\n\n* legend offset (bbbbbbb)\n");
    }
}
