//! End-to-end walks over real git repositories

use anyhow::Result;
use git2::{Commit, Oid, Repository, Signature, Time};
use gitsearch_core::{Origin, RepoIdentity};
use gitsearch_db::GitSearchDb;
use gitsearch_index::{CommitGraph, CommitWalker, GitCommitGraph, NullDisplay};
use tempfile::TempDir;

struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let repo = Repository::init(dir.path())?;
        repo.remote("origin", "https://github.com/tools/indexer.git")?;
        Ok(Self { dir, repo })
    }

    /// Commits the first parent's tree plus `files`; does not move any ref
    fn commit(
        &self,
        parents: &[Oid],
        files: &[(&str, &str)],
        message: &str,
        time: i64,
    ) -> Result<Oid> {
        let base = match parents.first() {
            Some(oid) => Some(self.repo.find_commit(*oid)?.tree()?),
            None => None,
        };
        let mut builder = self.repo.treebuilder(base.as_ref())?;
        for (name, content) in files {
            let blob = self.repo.blob(content.as_bytes())?;
            builder.insert(*name, blob, 0o100644)?;
        }
        let tree = self.repo.find_tree(builder.write()?)?;

        let sig = Signature::new("Jane Doe", "jane@example.com", &Time::new(time, 0))?;
        let parent_commits = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid))
            .collect::<Result<Vec<Commit<'_>>, _>>()?;
        let parent_refs: Vec<&Commit<'_>> = parent_commits.iter().collect();

        Ok(self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)?)
    }

    fn set_head(&self, oid: Oid) -> Result<()> {
        self.repo.reference("refs/heads/main", oid, true, "test head")?;
        self.repo.set_head("refs/heads/main")?;
        Ok(())
    }
}

struct History {
    c1: Oid,
    c2: Oid,
    f1: Oid,
    merge: Oid,
}

/// root -> c1 -> c2 -> merge, with f1 branching off c1 and landing as PR #12
fn build_history(repo: &TestRepo) -> Result<History> {
    let root = repo.commit(&[], &[("README.md", "indexer\n")], "Initial import", 1_700_000_000)?;
    let c1 = repo.commit(&[root], &[("walker.rs", "fn walk() {}\n")], "Add walker", 1_700_000_100)?;
    let c2 = repo.commit(
        &[c1],
        &[("store.rs", "trait Store {}\n"), ("README.md", "indexer v2\n")],
        "Add store\n\nAlso bumps the readme",
        1_700_000_200,
    )?;
    let f1 = repo.commit(&[c1], &[("graph.rs", "trait Graph {}\n")], "Add graph", 1_700_000_300)?;
    let merge = repo.commit(
        &[c2, f1],
        &[("graph.rs", "trait Graph {}\n")],
        "Merge pull request #12 in tools/indexer from feature/graph to main",
        1_700_000_400,
    )?;
    repo.set_head(merge)?;
    Ok(History { c1, c2, f1, merge })
}

fn index(repo: &TestRepo, db: &GitSearchDb, recycle_after: usize) -> Result<usize> {
    let graph = GitCommitGraph::open(repo.dir.path())?.with_recycle_after(recycle_after);
    let url = graph.remote_url("origin")?.unwrap_or_default();
    let identity = RepoIdentity::from_remote_url(&url)?;
    CommitWalker::new(graph, db, NullDisplay, identity).run()
}

#[test]
fn test_remote_identity() -> Result<()> {
    let repo = TestRepo::new()?;
    let graph = GitCommitGraph::open(repo.dir.path())?;

    let url = graph.remote_url("origin")?.unwrap_or_default();
    let identity = RepoIdentity::from_remote_url(&url)?;
    assert_eq!(identity.project, "tools");
    assert_eq!(identity.repo, "indexer");
    assert_eq!(identity.origin, Origin::GitHub);

    // Unknown remote names fall back to the first configured one
    assert_eq!(graph.remote_url("upstream")?, Some(url));
    Ok(())
}

#[test]
fn test_empty_repository_writes_nothing() -> Result<()> {
    let repo = TestRepo::new()?;
    let db_dir = tempfile::tempdir()?;
    let db = GitSearchDb::open(db_dir.path())?;

    let mut graph = GitCommitGraph::open(repo.dir.path())?;
    assert!(graph.head()?.is_none());

    assert_eq!(index(&repo, &db, 0)?, 0);
    assert!(db.is_empty());
    Ok(())
}

#[test]
fn test_walk_indexes_repository() -> Result<()> {
    let repo = TestRepo::new()?;
    let history = build_history(&repo)?;
    let db_dir = tempfile::tempdir()?;
    let db = GitSearchDb::open(db_dir.path())?;

    assert_eq!(index(&repo, &db, 0)?, 3);
    assert_eq!(db.commit_count(), 3);

    let c1 = db
        .get(&history.c1.to_string(), "tools", "indexer")?
        .expect("c1 should be indexed");
    assert_eq!(c1.files, vec!["walker.rs".to_string()]);
    assert_eq!(c1.pr, "");
    assert!(c1.merge_via.is_empty());
    assert_eq!(c1.author_name, "Jane Doe");
    assert_eq!(c1.origin, Origin::GitHub);
    assert_eq!(c1.date, "20231114T2215000000000Z");

    let mut c2 = db
        .get(&history.c2.to_string(), "tools", "indexer")?
        .expect("c2 should be indexed");
    c2.files.sort();
    assert_eq!(c2.files, vec!["README.md".to_string(), "store.rs".to_string()]);
    assert_eq!(c2.description[0], "Add store");

    let f1 = db
        .get(&history.f1.to_string(), "tools", "indexer")?
        .expect("f1 should be indexed");
    assert_eq!(f1.pr, "12");
    assert_eq!(f1.merge_via, vec![history.merge.to_string()]);
    assert_eq!(f1.files, vec!["graph.rs".to_string()]);

    assert!(db
        .get(&history.merge.to_string(), "tools", "indexer")?
        .is_none());

    let newest_first: Vec<String> = db
        .commits_for_repo("tools", "indexer")?
        .into_iter()
        .map(|r| r.commit_id)
        .collect();
    assert_eq!(
        newest_first,
        vec![history.f1.to_string(), history.c2.to_string(), history.c1.to_string()]
    );
    Ok(())
}

#[test]
fn test_second_walk_writes_nothing() -> Result<()> {
    let repo = TestRepo::new()?;
    build_history(&repo)?;
    let db_dir = tempfile::tempdir()?;
    let db = GitSearchDb::open(db_dir.path())?;

    assert_eq!(index(&repo, &db, 0)?, 3);
    assert_eq!(index(&repo, &db, 0)?, 0);
    assert_eq!(db.commit_count(), 3);
    Ok(())
}

#[test]
fn test_recycled_handle_gives_same_records() -> Result<()> {
    let repo = TestRepo::new()?;
    build_history(&repo)?;

    let plain_dir = tempfile::tempdir()?;
    let plain = GitSearchDb::open(plain_dir.path())?;
    let recycled_dir = tempfile::tempdir()?;
    let recycled = GitSearchDb::open(recycled_dir.path())?;

    assert_eq!(index(&repo, &plain, 0)?, 3);
    assert_eq!(index(&repo, &recycled, 1)?, 3);
    assert_eq!(
        plain.commits_for_repo("tools", "indexer")?,
        recycled.commits_for_repo("tools", "indexer")?
    );
    Ok(())
}

#[test]
fn test_parents_keep_recorded_order() -> Result<()> {
    let repo = TestRepo::new()?;
    let history = build_history(&repo)?;
    let mut graph = GitCommitGraph::open(repo.dir.path())?;

    let head = graph.head()?.expect("history has a HEAD");
    assert_eq!(head.id, history.merge.to_string());

    let parents: Vec<String> = graph.parents(&head)?.into_iter().map(|p| p.id).collect();
    assert_eq!(parents, vec![history.c2.to_string(), history.f1.to_string()]);
    assert!(graph.lookup("not-a-sha").is_err());
    Ok(())
}

#[test]
fn test_abbreviated_boundary_is_resolved() -> Result<()> {
    let repo = TestRepo::new()?;
    let history = build_history(&repo)?;
    let db_dir = tempfile::tempdir()?;
    let db = GitSearchDb::open(db_dir.path())?;
    let graph = GitCommitGraph::open(repo.dir.path())?;

    let c1 = history.c1.to_string();
    let boundary = graph.resolve(&c1[..12])?;
    assert_eq!(boundary, c1);
    assert_eq!(graph.resolve("main~1")?, history.c2.to_string());
    assert!(graph.resolve("no-such-branch").is_err());

    let identity = RepoIdentity::new("tools", "indexer", Origin::GitHub);
    let written = CommitWalker::new(graph, &db, NullDisplay, identity)
        .with_boundary(boundary)
        .run()?;

    assert_eq!(written, 2);
    assert!(db.get(&c1, "tools", "indexer")?.is_none());
    assert!(db.get(&history.c2.to_string(), "tools", "indexer")?.is_some());
    assert!(db.get(&history.f1.to_string(), "tools", "indexer")?.is_some());
    Ok(())
}
