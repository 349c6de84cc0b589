/*!
 * Safe, minimal operations on one git working copy.
 *
 * The `RepositoryHandle` wraps a live `git2` session and exposes the small
 * set of operations the publish pipeline needs: clean-check, branch
 * checkout, fast-forward pull, selective commit and push. It is not a
 * general-purpose git layer; anything beyond a fast-forward (conflict
 * resolution, history rewriting) is out of scope and surfaces as an error.
 */

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, Oid, Repository, ResetType, Signature, Status, StatusOptions};
use log::debug;

use crate::errors::RepoError;

/// The only remote name the pipeline operates against.
pub const ORIGIN: &str = "origin";

/// A commit author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            email: email.into(),
        }
    }

    fn signature(&self) -> Result<Signature<'static>, git2::Error> {
        Signature::now(&self.name, &self.email)
    }
}

/// Outcome of a successful [`RepositoryHandle::pull`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The local branch already matched its upstream; nothing was touched.
    UpToDate,
    /// The branch pointer and the working tree were advanced to the
    /// upstream commit.
    FastForwarded,
}

/// A handle on one local working copy.
///
/// Created per pipeline run and discarded at process end; nothing is cached
/// across calls, so every status check reflects the live filesystem.
pub struct RepositoryHandle {
    path: PathBuf,
    repo: Repository,
}

impl RepositoryHandle {
    /// Open an existing working copy.
    ///
    /// The repository root is discovered by walking ancestors of `path`,
    /// like the git command line does. Fails with
    /// [`RepoError::NotARepository`] when nothing is found.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepoError> {
        let path = path.as_ref().to_path_buf();
        let repo = Repository::discover(&path)
            .map_err(|_| RepoError::NotARepository(path.display().to_string()))?;
        Ok(RepositoryHandle { path, repo })
    }

    /// Path this handle was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the working tree has no changes at all.
    ///
    /// True iff every entry's status is plain "unmodified" or "ignored";
    /// any new, modified or staged entry makes it false. Derived from the
    /// live filesystem on every call.
    pub fn is_clean(&self) -> Result<bool, RepoError> {
        let statuses = self.repo.statuses(Some(&mut status_options()))?;
        Ok(statuses
            .iter()
            .all(|entry| entry.status() == Status::CURRENT || entry.status().is_ignored()))
    }

    /// Name of the currently checked-out branch, or `None` when HEAD is
    /// detached or unborn.
    pub fn current_branch(&self) -> Result<Option<String>, RepoError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|name| name.to_string()))
    }

    /// Equivalent to `git checkout <branch>` with force semantics.
    ///
    /// Switches the working tree to the named local branch and moves HEAD.
    /// Uncommitted edits on the files being switched are discarded, so
    /// callers that care must check [`Self::is_clean`] first; `checkout`
    /// itself does not.
    pub fn checkout(&self, branch: &str) -> Result<(), RepoError> {
        let branch_ref = self
            .repo
            .find_branch(branch, BranchType::Local)
            .map_err(|_| RepoError::NoSuchBranch(branch.to_string()))?;
        let refname = branch_ref
            .get()
            .name()
            .ok_or_else(|| RepoError::NoSuchBranch(branch.to_string()))?
            .to_string();
        let target = branch_ref.get().peel_to_commit()?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo
            .checkout_tree(target.as_object(), Some(&mut checkout))?;
        self.repo.set_head(&refname)?;
        Ok(())
    }

    /// Equivalent to `git pull`, restricted to fast-forward merges.
    ///
    /// Refuses to run on a dirty working tree (no fetch is performed in
    /// that case) or with a detached HEAD. Fetches `origin`, then either
    /// short-circuits when the branch already matches its upstream or
    /// advances both the branch pointer and the working tree. Divergent
    /// histories are fatal; no three-way merge is attempted.
    pub fn pull(&self) -> Result<PullOutcome, RepoError> {
        if !self.is_clean()? {
            return Err(RepoError::DirtyRepository(self.path.display().to_string()));
        }

        let branch_name = self.current_branch()?.ok_or_else(|| {
            RepoError::DirtyRepository(format!("{}: not on a branch", self.path.display()))
        })?;

        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|_| RepoError::NoSuchRemote(ORIGIN.to_string()))?;
        // empty refspec list falls back to the remote's configured refspecs
        remote.fetch(&[] as &[&str], None, None)?;

        let local = self.repo.find_branch(&branch_name, BranchType::Local)?;
        let upstream = local
            .upstream()
            .map_err(|_| RepoError::NoUpstream(branch_name.clone()))?;
        let upstream_oid = upstream
            .get()
            .target()
            .ok_or_else(|| RepoError::NoUpstream(branch_name.clone()))?;

        let annotated = self.repo.find_annotated_commit(upstream_oid)?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            debug!("{}: already up to date", branch_name);
            return Ok(PullOutcome::UpToDate);
        }
        if !analysis.is_fast_forward() {
            return Err(RepoError::DivergentHistory(branch_name));
        }

        // advance the branch pointer, then the working tree
        let refname = format!("refs/heads/{}", branch_name);
        let mut reference = self.repo.find_reference(&refname)?;
        reference.set_target(upstream_oid, "pull: fast-forward")?;
        self.repo.set_head(&refname)?;
        let target = self.repo.find_object(upstream_oid, None)?;
        self.repo.reset(&target, ResetType::Hard, None)?;

        debug!("{}: fast-forwarded to {}", branch_name, upstream_oid);
        Ok(PullOutcome::FastForwarded)
    }

    /// Equivalent to `git commit` over a selectively staged index.
    ///
    /// `paragraphs` form the commit message, joined with newlines. The
    /// working-tree status is re-read at call time: every modified file is
    /// staged unconditionally, new files only when `add_new` is set, and
    /// everything else is left out of the commit. The committer defaults to
    /// the author. The new commit has the current branch tip as its sole
    /// parent and the branch is advanced to it.
    pub fn commit(
        &self,
        paragraphs: &[&str],
        author: &Identity,
        add_new: bool,
        committer: Option<&Identity>,
    ) -> Result<Oid, RepoError> {
        let message = paragraphs.join("\n");
        let author_sig = author.signature()?;
        let committer_sig = committer.unwrap_or(author).signature()?;

        let mut index = self.repo.index()?;
        let statuses = self.repo.statuses(Some(&mut status_options()))?;
        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let status = entry.status();
            if status.contains(Status::WT_NEW) {
                if add_new {
                    index.add_path(Path::new(path))?;
                }
            } else if status.contains(Status::WT_MODIFIED) {
                index.add_path(Path::new(path))?;
            }
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = self.repo.head()?.peel_to_commit()?;
        let oid = self.repo.commit(
            Some("HEAD"),
            &author_sig,
            &committer_sig,
            &message,
            &tree,
            &[&parent],
        )?;
        Ok(oid)
    }

    /// Equivalent to `git push origin <current-branch>`.
    pub fn push(&self) -> Result<(), RepoError> {
        let branch = self.current_branch()?.ok_or(RepoError::NoCurrentBranch)?;
        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|_| RepoError::NoSuchRemote(ORIGIN.to_string()))?;
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        remote.push(&[refspec.as_str()], None)?;
        Ok(())
    }
}

fn status_options() -> StatusOptions {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    options
}
