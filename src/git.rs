//! The narrow slice of git the UI is written against.
//!
//! The view layer never touches an object database directly; everything goes
//! through [`Repo`], which deals in whole commits and branch tips. Backend
//! error text is passed through verbatim inside [`Error::Git`] so the user
//! sees what git actually said.

use std::collections::BTreeMap;
use std::fmt;

use crate::{Error, Result};

/// A commit id. Stored as the full hex string; display code abbreviates.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Oid(String);

impl Oid {
    pub fn new(s: impl Into<String>) -> Oid {
        Oid(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The abbreviated form used everywhere in the UI.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the epoch.
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: Oid,
    /// First parent first.
    pub parents: Vec<Oid>,
    pub author: Signature,
    /// The first line of the message.
    pub summary: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub target: Oid,
    /// The tracking ref name, if one is configured.
    pub upstream: Option<String>,
}

/// Everything the UI needs from a repository.
pub trait Repo {
    fn lookup(&self, id: &Oid) -> Result<Commit>;

    /// Walk the first-parent chain starting at `from`, newest first, at
    /// most `limit` commits. Merges contribute only their first parent;
    /// the UI presents linear slices.
    fn walk(&self, from: &Oid, limit: usize) -> Result<Vec<Commit>>;

    /// All local branches, sorted by name.
    fn branches(&self) -> Result<Vec<Branch>>;

    /// Resolve a revision expression: a branch name, a full id, or an
    /// unambiguous id prefix.
    fn resolve(&self, rev: &str) -> Result<Oid>;

    fn create_commit(
        &mut self,
        parents: &[Oid],
        author: Signature,
        message: &str,
    ) -> Result<Oid>;

    /// Rewrite a commit's message, yielding the replacement id. Parents and
    /// author are preserved.
    fn amend(&mut self, id: &Oid, message: &str) -> Result<Oid>;

    /// Point a branch at a commit, creating the branch if needed.
    fn update_ref(&mut self, branch: &str, target: &Oid) -> Result<()>;

    fn upstream(&self, branch: &str) -> Result<Option<Branch>>;
}

fn summary_of(message: &str) -> String {
    message.lines().next().unwrap_or("").to_string()
}

/// An in-memory repository. The unit tests and demos run against this;
/// nothing in the view layer can tell it apart from a real one.
#[derive(Debug, Default)]
pub struct MemRepo {
    commits: BTreeMap<Oid, Commit>,
    branches: BTreeMap<String, Branch>,
    upstreams: BTreeMap<String, Branch>,
    next_id: u64,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        MemRepo::default()
    }

    fn gen_id(&mut self) -> Oid {
        self.next_id += 1;
        Oid(format!("{:040x}", self.next_id))
    }

    /// Seed a linear chain of commits and point a branch at the tip.
    pub fn seed_chain(&mut self, branch: &str, messages: &[&str]) -> Result<Oid> {
        let mut parent: Option<Oid> = None;
        for (i, m) in messages.iter().enumerate() {
            let parents: Vec<Oid> = parent.iter().cloned().collect();
            let author = Signature {
                name: "test".into(),
                email: "test@example.com".into(),
                time: i as i64,
            };
            parent = Some(self.create_commit(&parents, author, m)?);
        }
        let tip = parent.ok_or_else(|| Error::Git("empty chain".into()))?;
        self.update_ref(branch, &tip)?;
        Ok(tip)
    }

    pub fn set_upstream(&mut self, branch: &str, upstream: Branch) {
        if let Some(b) = self.branches.get_mut(branch) {
            b.upstream = Some(upstream.name.clone());
        }
        self.upstreams.insert(branch.to_string(), upstream);
    }
}

impl Repo for MemRepo {
    fn lookup(&self, id: &Oid) -> Result<Commit> {
        self.commits
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Git(format!("object not found: {}", id)))
    }

    fn walk(&self, from: &Oid, limit: usize) -> Result<Vec<Commit>> {
        let mut out = Vec::new();
        let mut cur = Some(from.clone());
        while let Some(id) = cur {
            if out.len() >= limit {
                break;
            }
            let c = self.lookup(&id)?;
            cur = c.parents.first().cloned();
            out.push(c);
        }
        Ok(out)
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        Ok(self.branches.values().cloned().collect())
    }

    fn resolve(&self, rev: &str) -> Result<Oid> {
        if let Some(b) = self.branches.get(rev) {
            return Ok(b.target.clone());
        }
        let matches: Vec<&Oid> = self
            .commits
            .keys()
            .filter(|id| id.as_str().starts_with(rev))
            .collect();
        match matches.as_slice() {
            [one] => Ok((*one).clone()),
            [] => Err(Error::Git(format!("unknown revision: {}", rev))),
            _ => Err(Error::Git(format!("ambiguous revision: {}", rev))),
        }
    }

    fn create_commit(
        &mut self,
        parents: &[Oid],
        author: Signature,
        message: &str,
    ) -> Result<Oid> {
        for p in parents {
            if !self.commits.contains_key(p) {
                return Err(Error::Git(format!("parent not found: {}", p)));
            }
        }
        let id = self.gen_id();
        self.commits.insert(
            id.clone(),
            Commit {
                id: id.clone(),
                parents: parents.to_vec(),
                author,
                summary: summary_of(message),
                message: message.to_string(),
            },
        );
        Ok(id)
    }

    fn amend(&mut self, id: &Oid, message: &str) -> Result<Oid> {
        let old = self.lookup(id)?;
        let new_id = self.gen_id();
        self.commits.insert(
            new_id.clone(),
            Commit {
                id: new_id.clone(),
                parents: old.parents,
                author: old.author,
                summary: summary_of(message),
                message: message.to_string(),
            },
        );
        Ok(new_id)
    }

    fn update_ref(&mut self, branch: &str, target: &Oid) -> Result<()> {
        if !self.commits.contains_key(target) {
            return Err(Error::Git(format!("target not found: {}", target)));
        }
        let upstream = self
            .branches
            .get(branch)
            .and_then(|b| b.upstream.clone());
        self.branches.insert(
            branch.to_string(),
            Branch {
                name: branch.to_string(),
                target: target.clone(),
                upstream,
            },
        );
        Ok(())
    }

    fn upstream(&self, branch: &str) -> Result<Option<Branch>> {
        Ok(self.upstreams.get(branch).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_is_first_parent_newest_first() -> Result<()> {
        let mut r = MemRepo::new();
        let tip = r.seed_chain("main", &["one", "two", "three"])?;
        let log = r.walk(&tip, 10)?;
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].summary, "three");
        assert_eq!(log[2].summary, "one");
        assert_eq!(r.walk(&tip, 2)?.len(), 2);
        Ok(())
    }

    #[test]
    fn resolve_branch_and_prefix() -> Result<()> {
        let mut r = MemRepo::new();
        let tip = r.seed_chain("main", &["one"])?;
        assert_eq!(r.resolve("main")?, tip);
        assert_eq!(r.resolve(tip.short())?, tip);
        assert!(matches!(r.resolve("deadbeef"), Err(Error::Git(_))));
        Ok(())
    }

    #[test]
    fn amend_preserves_parents() -> Result<()> {
        let mut r = MemRepo::new();
        let tip = r.seed_chain("main", &["one", "two"])?;
        let amended = r.amend(&tip, "two, reworded\n\nbody")?;
        assert_ne!(amended, tip);
        let c = r.lookup(&amended)?;
        assert_eq!(c.summary, "two, reworded");
        assert_eq!(c.parents, r.lookup(&tip)?.parents);
        // The old commit is still reachable by id.
        assert!(r.lookup(&tip).is_ok());
        Ok(())
    }

    #[test]
    fn update_ref_moves_branch() -> Result<()> {
        let mut r = MemRepo::new();
        let tip = r.seed_chain("main", &["one", "two"])?;
        let one = r.walk(&tip, 2)?[1].id.clone();
        r.update_ref("main", &one)?;
        assert_eq!(r.resolve("main")?, one);
        assert!(r.update_ref("other", &tip).is_ok());
        assert_eq!(r.branches()?.len(), 2);
        Ok(())
    }
}
