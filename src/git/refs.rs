//! Ref read/write operations.

use indexmap::IndexMap;

use super::parse::{parse_ref_listing, parse_trailers};
use super::{FetchRecord, FetchStatus, RefUpdate, Repository};

impl Repository {
    /// Whether `refname` exists as a real (fully qualified) ref.
    pub fn ref_exists(&self, refname: &str) -> anyhow::Result<bool> {
        self.run_check(&["show-ref", "--verify", "--quiet", refname])
    }

    /// Resolve a ref (or any revision expression) to a commit id.
    pub fn resolve(&self, refname: &str) -> anyhow::Result<Option<String>> {
        let expr = format!("{refname}^{{commit}}");
        let output = self.output(&["rev-parse", "--verify", "--quiet", &expr])?;
        if output.status.success() {
            Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else {
            Ok(None)
        }
    }

    pub fn update_ref(&self, refname: &str, sha: &str) -> anyhow::Result<()> {
        self.run(&["update-ref", refname, sha])?;
        Ok(())
    }

    pub fn delete_ref(&self, refname: &str) -> anyhow::Result<()> {
        self.run(&["update-ref", "-d", refname])?;
        Ok(())
    }

    /// Apply a batch of ref updates in one atomic `update-ref --stdin`
    /// transaction. Either every update lands or none does.
    pub fn update_refs(&self, updates: &[RefUpdate]) -> anyhow::Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut script = String::new();
        for update in updates {
            match update {
                RefUpdate::Set { refname, sha } => {
                    script.push_str(&format!("update {refname} {sha}\n"));
                }
                RefUpdate::Delete { refname } => {
                    script.push_str(&format!("delete {refname}\n"));
                }
            }
        }
        self.run_with_input(&["update-ref", "--stdin"], script.as_bytes())?;
        Ok(())
    }

    /// List `(refname, sha)` pairs under a prefix, in git's ref order.
    pub fn iter_refs(&self, prefix: &str) -> anyhow::Result<Vec<(String, String)>> {
        let output = self.run(&[
            "for-each-ref",
            "--format=%(objectname) %(refname)",
            prefix,
        ])?;
        Ok(parse_ref_listing(&output)?)
    }

    /// Copy every ref under `src_prefix` to the same leaf under
    /// `dst_prefix`, returning one record per target in listing order.
    /// Targets are overwritten; the records preserve the previous value so
    /// callers can revert individual moves after inspecting them.
    pub fn copy_refs(
        &self,
        src_prefix: &str,
        dst_prefix: &str,
    ) -> anyhow::Result<Vec<FetchRecord>> {
        let mut records = Vec::new();
        for (refname, sha) in self.iter_refs(src_prefix)? {
            let Some(rest) = refname.strip_prefix(src_prefix) else {
                continue;
            };
            let target = format!("{dst_prefix}{rest}");
            if let Some(record) = self.set_ref_recorded(&target, &sha)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Copy one ref, returning the update record; `None` when the source
    /// does not exist.
    pub fn copy_ref(&self, src: &str, dst: &str) -> anyhow::Result<Option<FetchRecord>> {
        match self.resolve(src)? {
            Some(sha) => self.set_ref_recorded(dst, &sha),
            None => Ok(None),
        }
    }

    fn set_ref_recorded(&self, target: &str, sha: &str) -> anyhow::Result<Option<FetchRecord>> {
        let old = self.resolve(target)?;
        let status = match old.as_deref() {
            None => FetchStatus::New,
            Some(existing) if existing == sha => FetchStatus::UpToDate,
            Some(_) => FetchStatus::Forced,
        };
        if status != FetchStatus::UpToDate {
            self.update_ref(target, sha)?;
        }
        Ok(Some(FetchRecord {
            status,
            old,
            new: sha.to_string(),
            local_ref: target.to_string(),
        }))
    }

    /// Create or move a lightweight tag.
    pub fn tag(&self, name: &str, target: &str, force: bool) -> anyhow::Result<()> {
        if force {
            self.run(&["tag", "-f", name, target])?;
        } else {
            self.run(&["tag", name, target])?;
        }
        Ok(())
    }

    /// Read the trailer block of a commit as a key/value map.
    pub fn read_trailers(&self, sha: &str) -> anyhow::Result<IndexMap<String, String>> {
        let output = self.run(&["show", "-s", "--format=%(trailers:only,unfold)", sha])?;
        Ok(parse_trailers(&output))
    }

    /// `git describe` of HEAD: nearest tag, or the abbreviated commit when
    /// nothing is tagged yet.
    pub fn describe(&self) -> anyhow::Result<String> {
        self.run(&["describe", "--tags", "--always"])
    }

    /// Names of the configured remotes.
    pub fn remotes(&self) -> anyhow::Result<Vec<String>> {
        let output = self.run(&["remote"])?;
        Ok(output.lines().map(str::to_string).collect())
    }

    /// URL of a remote, when configured.
    pub fn remote_url(&self, remote: &str) -> anyhow::Result<Option<String>> {
        let output = self.output(&["remote", "get-url", remote])?;
        if output.status.success() {
            Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else {
            Ok(None)
        }
    }
}
