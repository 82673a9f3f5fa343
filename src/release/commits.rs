//! Commit analysis
//!
//! Reads the commits made since the last `v<semver>` tag and classifies them
//! with the conventional commit rules.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use git2::{Repository, Sort};
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::version::{ReleaseType, ReleaseVersion};

/// A commit as read from history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub id: String,
    pub message: String,
}

impl RawCommit {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self { id: id.into(), message: message.into() }
    }
}

/// Where commits and release tags come from
pub trait CommitSource {
    /// Highest `v<semver>` tag, if any
    fn last_release(&self) -> Result<Option<ReleaseVersion>>;

    /// Commits reachable from HEAD but not from the `last` tag, newest first
    fn commits_since(&self, last: Option<&ReleaseVersion>) -> Result<Vec<RawCommit>>;
}

/// `CommitSource` over a local git repository
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path.as_ref())?;
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// Name of the checked-out branch
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(str::to_string)
    }
}

impl CommitSource for GitHistory {
    /// Highest version tag reachable from HEAD
    fn last_release(&self) -> Result<Option<ReleaseVersion>> {
        let Some(head) = self.repo.head().ok().and_then(|h| h.target()) else {
            return Ok(None);
        };

        let mut latest: Option<ReleaseVersion> = None;
        for name in self.repo.tag_names(Some("v*"))?.iter().flatten() {
            let Some(version) = ReleaseVersion::from_tag(name) else {
                continue;
            };
            let tagged = self
                .repo
                .revparse_single(&format!("refs/tags/{}", name))?
                .peel_to_commit()?
                .id();
            if tagged == head || self.repo.graph_descendant_of(head, tagged)? {
                latest = latest.max(Some(version));
            } else {
                debug!("Ignoring {}: not an ancestor of HEAD", name);
            }
        }
        Ok(latest)
    }

    fn commits_since(&self, last: Option<&ReleaseVersion>) -> Result<Vec<RawCommit>> {
        // An unborn HEAD has no history
        let Ok(head) = self.repo.head() else {
            return Ok(Vec::new());
        };
        let Some(head) = head.target() else {
            return Ok(Vec::new());
        };

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push(head)?;
        if let Some(version) = last {
            let tagged = self
                .repo
                .revparse_single(&version.tag_string())?
                .peel_to_commit()?;
            walk.hide(tagged.id())?;
        }

        let mut commits = Vec::new();
        for oid in walk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(RawCommit {
                id: commit.id().to_string(),
                message: commit.message().unwrap_or_default().to_string(),
            });
        }
        debug!("{} commit(s) since {:?}", commits.len(), last.map(|v| v.tag_string()));
        Ok(commits)
    }
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<kind>[A-Za-z]+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!)?: (?P<subject>.+)$")
            .unwrap()
    })
}

fn issue_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:^|[^\w&])#(\d+)\b").unwrap())
}

/// A commit whose header follows `<type>(<scope>)!: <subject>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub id: String,
    pub kind: String,
    pub scope: Option<String>,
    pub subject: String,
    /// Text of the `BREAKING CHANGE:` footer, or the subject for `type!:`
    pub breaking: Option<String>,
    /// Issue numbers referenced anywhere in the message
    pub issues: Vec<u64>,
}

impl ConventionalCommit {
    /// `None` when the header is not conventional
    pub fn parse(commit: &RawCommit) -> Option<Self> {
        let mut lines = commit.message.lines();
        let header = lines.next()?.trim();
        let caps = header_pattern().captures(header)?;

        let subject = caps["subject"].trim().to_string();
        let footer = commit.message.lines().skip(1).find_map(|line| {
            line.strip_prefix("BREAKING CHANGE:")
                .or_else(|| line.strip_prefix("BREAKING-CHANGE:"))
                .map(|text| text.trim().to_string())
        });
        let breaking = match (footer, caps.name("bang").is_some()) {
            (Some(text), _) => Some(text),
            (None, true) => Some(subject.clone()),
            (None, false) => None,
        };

        let issues: BTreeSet<u64> = issue_pattern()
            .captures_iter(&commit.message)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        Some(Self {
            id: commit.id.clone(),
            kind: caps["kind"].to_lowercase(),
            scope: caps
                .name("scope")
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty()),
            subject,
            breaking,
            issues: issues.into_iter().collect(),
        })
    }

    /// Bump this commit warrants, if any
    pub fn release_type(&self) -> Option<ReleaseType> {
        if self.breaking.is_some() {
            return Some(ReleaseType::Major);
        }
        match self.kind.as_str() {
            "feat" => Some(ReleaseType::Minor),
            "fix" | "perf" => Some(ReleaseType::Patch),
            _ => None,
        }
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(7)]
    }
}

/// Highest bump among `commits`
pub fn highest_bump(commits: &[ConventionalCommit]) -> Option<ReleaseType> {
    commits.iter().filter_map(ConventionalCommit::release_type).max()
}

/// What the Analyzing state found
#[derive(Debug, Clone)]
pub struct Analysis {
    pub last_release: Option<ReleaseVersion>,
    pub commits: Vec<ConventionalCommit>,
    pub release_type: Option<ReleaseType>,
}

impl Analysis {
    /// Next version, or `None` when nothing qualifies for a release
    pub fn next_version(&self) -> Option<ReleaseVersion> {
        let release_type = self.release_type?;
        Some(match &self.last_release {
            Some(last) => last.bump(release_type),
            None => ReleaseVersion::initial(),
        })
    }
}

pub fn analyze(source: &dyn CommitSource) -> Result<Analysis> {
    let last_release = source.last_release()?;
    let commits: Vec<ConventionalCommit> = source
        .commits_since(last_release.as_ref())?
        .iter()
        .filter_map(ConventionalCommit::parse)
        .collect();
    let release_type = highest_bump(&commits);
    Ok(Analysis { last_release, commits, release_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn parse(message: &str) -> ConventionalCommit {
        ConventionalCommit::parse(&RawCommit::new("0123456789abcdef", message)).unwrap()
    }

    #[test]
    fn test_parse_header() {
        let commit = parse("feat(display): add DisplayText3D (#42)\n\nCloses #7");
        assert_eq!(commit.kind, "feat");
        assert_eq!(commit.scope.as_deref(), Some("display"));
        assert_eq!(commit.subject, "add DisplayText3D (#42)");
        assert_eq!(commit.issues, vec![7, 42]);
        assert_eq!(commit.short_id(), "0123456");
        assert_eq!(commit.release_type(), Some(ReleaseType::Minor));
    }

    #[test]
    fn test_release_types() {
        assert_eq!(parse("fix: clamp radius").release_type(), Some(ReleaseType::Patch));
        assert_eq!(parse("perf: cache closures").release_type(), Some(ReleaseType::Patch));
        assert_eq!(parse("docs: typo").release_type(), None);
        assert_eq!(parse("feat!: drop Ray2D").release_type(), Some(ReleaseType::Major));
        let footer = parse("refactor: rename\n\nBREAKING CHANGE: Plane.n is now required");
        assert_eq!(footer.breaking.as_deref(), Some("Plane.n is now required"));
        assert_eq!(footer.release_type(), Some(ReleaseType::Major));
    }

    #[test]
    fn test_non_conventional_ignored() {
        assert!(ConventionalCommit::parse(&RawCommit::new("a", "Merge branch 'master'")).is_none());
        assert!(ConventionalCommit::parse(&RawCommit::new("a", "")).is_none());
    }

    #[test]
    fn test_highest_bump_wins() {
        let commits = vec![parse("fix: a"), parse("feat: b"), parse("chore: c")];
        assert_eq!(highest_bump(&commits), Some(ReleaseType::Minor));
        assert_eq!(highest_bump(&[parse("chore: c")]), None);
    }

    fn commit(repo: &Repository, message: &str) -> git2::Oid {
        let sig = Signature::now("Release Bot", "bot@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap()
    }

    fn tag(repo: &Repository, name: &str) {
        let obj = repo.revparse_single("HEAD").unwrap();
        let sig = Signature::now("Release Bot", "bot@example.com").unwrap();
        repo.tag(name, &obj, &sig, name, false).unwrap();
    }

    #[test]
    fn test_git_history_since_last_tag() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, "feat: initial catalog");
        tag(&repo, "v1.0.0");
        commit(&repo, "fix: old fix");
        tag(&repo, "v1.0.1");
        tag(&repo, "not-a-version");
        commit(&repo, "fix: legend offset");
        commit(&repo, "feat: add Cone");

        let history = GitHistory::from_repository(repo);
        let analysis = analyze(&history).unwrap();
        assert_eq!(analysis.last_release.as_ref().unwrap().version_string(), "1.0.1");
        let subjects: Vec<&str> = analysis.commits.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, vec!["add Cone", "legend offset"]);
        assert_eq!(analysis.next_version().unwrap().version_string(), "1.1.0");
    }

    #[test]
    fn test_tags_off_the_current_branch_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, "feat: initial catalog");
        tag(&repo, "v1.0.0");

        // v2.0.0 sits on a commit HEAD never reaches
        let sig = Signature::now("Release Bot", "bot@example.com").unwrap();
        let base = repo.head().unwrap().peel_to_commit().unwrap();
        let side = repo
            .commit(None, &sig, &sig, "feat!: side branch", &base.tree().unwrap(), &[&base])
            .unwrap();
        let side = repo.find_object(side, None).unwrap();
        repo.tag("v2.0.0", &side, &sig, "v2.0.0", false).unwrap();

        commit(&repo, "fix: legend offset");
        drop(side);
        drop(base);

        let analysis = analyze(&GitHistory::from_repository(repo)).unwrap();
        assert_eq!(analysis.last_release.as_ref().unwrap().version_string(), "1.0.0");
        assert_eq!(analysis.commits.len(), 1);
        assert_eq!(analysis.next_version().unwrap().version_string(), "1.0.1");
    }

    #[test]
    fn test_first_release_is_initial_version() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, "fix: first");
        let analysis = analyze(&GitHistory::from_repository(repo)).unwrap();
        assert!(analysis.last_release.is_none());
        assert_eq!(analysis.next_version().unwrap().version_string(), "1.0.0");
    }

    #[test]
    fn test_empty_repository_has_no_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let analysis = analyze(&GitHistory::from_repository(repo)).unwrap();
        assert!(analysis.commits.is_empty());
        assert!(analysis.next_version().is_none());
    }
}
