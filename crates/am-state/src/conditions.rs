//! Nested dotted-path container of per-control-point series.

use crate::error::{StateError, StateResult};
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(Series),
    Branch(Conditions),
}

/// Tree of named series. Keys never contain `.`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions {
    children: BTreeMap<String, Node>,
}

fn split_path(path: &str) -> StateResult<Vec<&str>> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(StateError::InvalidPath { path: path.into() });
    }
    Ok(path.split('.').collect())
}

fn node_mut<'a>(cur: &'a mut Conditions, keys: &[&str], full: &str) -> StateResult<&'a mut Node> {
    let Some((first, rest)) = keys.split_first() else {
        return Err(StateError::InvalidPath { path: full.into() });
    };
    let node = cur
        .children
        .get_mut(*first)
        .ok_or_else(|| StateError::NotFound { path: full.into() })?;
    if rest.is_empty() {
        return Ok(node);
    }
    match node {
        Node::Branch(c) => node_mut(c, rest, full),
        Node::Leaf(_) => Err(StateError::NotABranch { path: full.into() }),
    }
}

fn branch_or_create<'a>(
    cur: &'a mut Conditions,
    keys: &[&str],
    full: &str,
) -> StateResult<&'a mut Conditions> {
    match keys.split_first() {
        None => Ok(cur),
        Some((first, rest)) => {
            let node = cur
                .children
                .entry((*first).to_string())
                .or_insert_with(|| Node::Branch(Conditions::default()));
            match node {
                Node::Branch(c) => branch_or_create(c, rest, full),
                Node::Leaf(_) => Err(StateError::NotABranch { path: full.into() }),
            }
        }
    }
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn node(&self, path: &str) -> StateResult<&Node> {
        let keys = split_path(path)?;
        let mut cur = self;
        for (i, key) in keys.iter().enumerate() {
            let node = cur
                .children
                .get(*key)
                .ok_or_else(|| StateError::NotFound { path: path.into() })?;
            if i + 1 == keys.len() {
                return Ok(node);
            }
            match node {
                Node::Branch(c) => cur = c,
                Node::Leaf(_) => {
                    return Err(StateError::NotABranch {
                        path: keys[..=i].join("."),
                    });
                }
            }
        }
        Err(StateError::InvalidPath { path: path.into() })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.node(path).is_ok()
    }

    pub fn deep_get(&self, path: &str) -> StateResult<&Series> {
        match self.node(path)? {
            Node::Leaf(s) => Ok(s),
            Node::Branch(_) => Err(StateError::NotALeaf { path: path.into() }),
        }
    }

    pub fn deep_get_mut(&mut self, path: &str) -> StateResult<&mut Series> {
        let keys = split_path(path)?;
        match node_mut(self, &keys, path)? {
            Node::Leaf(s) => Ok(s),
            Node::Branch(_) => Err(StateError::NotALeaf { path: path.into() }),
        }
    }

    /// Insert or replace the leaf at `path`, creating parent branches.
    pub fn deep_set(&mut self, path: &str, series: Series) -> StateResult<()> {
        let keys = split_path(path)?;
        let Some((leaf, parents)) = keys.split_last() else {
            return Err(StateError::InvalidPath { path: path.into() });
        };
        let parent = branch_or_create(self, parents, path)?;
        if let Some(Node::Branch(_)) = parent.children.get(*leaf) {
            return Err(StateError::NotALeaf { path: path.into() });
        }
        parent.children.insert((*leaf).to_string(), Node::Leaf(series));
        Ok(())
    }

    /// Shorthand for an n×1 leaf.
    pub fn set_values(&mut self, path: &str, values: &[f64]) -> StateResult<()> {
        self.deep_set(path, Series::column(values))
    }

    /// Column 0 of the leaf at `path`.
    pub fn values(&self, path: &str) -> StateResult<Vec<f64>> {
        Ok(self.deep_get(path)?.values())
    }

    pub fn remove(&mut self, path: &str) -> StateResult<Node> {
        let keys = split_path(path)?;
        let Some((leaf, parents)) = keys.split_last() else {
            return Err(StateError::InvalidPath { path: path.into() });
        };
        let parent = if parents.is_empty() {
            self
        } else {
            match node_mut(self, parents, path)? {
                Node::Branch(c) => c,
                Node::Leaf(_) => return Err(StateError::NotABranch { path: path.into() }),
            }
        };
        parent
            .children
            .remove(*leaf)
            .ok_or_else(|| StateError::NotFound { path: path.into() })
    }

    /// Get the leaf at `path`, creating a zero `rows`×`cols` leaf if absent.
    pub fn ensure(&mut self, path: &str, rows: usize, cols: usize) -> StateResult<&mut Series> {
        if !self.contains(path) {
            self.deep_set(path, Series::zeros(rows, cols))?;
        }
        self.deep_get_mut(path)
    }

    pub fn branch(&self, path: &str) -> StateResult<&Conditions> {
        match self.node(path)? {
            Node::Branch(c) => Ok(c),
            Node::Leaf(_) => Err(StateError::NotABranch { path: path.into() }),
        }
    }

    /// Mutable view of the sub-tree at `path`, created if missing.
    ///
    /// Collaborators get this instead of the whole container so they can
    /// only write under their own prefix.
    pub fn scope_mut(&mut self, path: &str) -> StateResult<&mut Conditions> {
        let keys = split_path(path)?;
        branch_or_create(self, &keys, path)
    }

    /// All leaves as `(dotted path, series)`, in key order.
    pub fn leaves(&self) -> Vec<(String, &Series)> {
        let mut out = Vec::new();
        self.collect_leaves("", &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Series)>) {
        for (key, node) in &self.children {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                Node::Leaf(s) => out.push((path, s)),
                Node::Branch(c) => c.collect_leaves(&path, out),
            }
        }
    }

    fn for_each_leaf_mut(&mut self, f: &mut dyn FnMut(&mut Series)) {
        for node in self.children.values_mut() {
            match node {
                Node::Leaf(s) => f(s),
                Node::Branch(c) => c.for_each_leaf_mut(f),
            }
        }
    }

    /// Largest row count over all leaves.
    pub fn row_count(&self) -> Option<usize> {
        self.leaves().iter().map(|(_, s)| s.rows()).max()
    }

    /// Give every leaf `n` rows.
    ///
    /// Leaves that already hold `n` rows are kept. Every other leaf is
    /// rebuilt from its first row. All leaves with more than one row must
    /// agree on their row count beforehand.
    pub fn expand(&mut self, n: usize) -> StateResult<()> {
        if n == 0 {
            return Err(StateError::ZeroRows);
        }
        let mut expected: Option<usize> = None;
        for (path, s) in self.leaves() {
            if s.rows() > 1 {
                match expected {
                    None => expected = Some(s.rows()),
                    Some(e) if e != s.rows() => {
                        return Err(StateError::InconsistentRows {
                            path,
                            rows: s.rows(),
                            expected: e,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        self.for_each_leaf_mut(&mut |s| {
            if s.rows() != n {
                *s = s.broadcast_row(0, n);
            }
        });
        Ok(())
    }

    /// Rebuild every leaf from its first row, whatever its current size.
    pub fn expand_override(&mut self, n: usize) -> StateResult<()> {
        if n == 0 {
            return Err(StateError::ZeroRows);
        }
        self.for_each_leaf_mut(&mut |s| *s = s.broadcast_row(0, n));
        Ok(())
    }

    /// One-row copy of the container holding each leaf's last row.
    pub fn last_row_snapshot(&self) -> Conditions {
        let children = self
            .children
            .iter()
            .map(|(k, node)| {
                let node = match node {
                    Node::Leaf(s) => Node::Leaf(s.last_row_series()),
                    Node::Branch(c) => Node::Branch(c.last_row_snapshot()),
                };
                (k.clone(), node)
            })
            .collect();
        Conditions { children }
    }

    /// Overlay every leaf of `other` onto `self`.
    pub fn merge(&mut self, other: &Conditions) -> StateResult<()> {
        for (path, s) in other.leaves() {
            self.deep_set(&path, s.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_set_creates_branches() {
        let mut c = Conditions::new();
        c.set_values("freestream.density", &[1.2]).unwrap();
        assert!(c.branch("freestream").is_ok());
        assert_eq!(c.deep_get("freestream.density").unwrap().first(), 1.2);
    }

    #[test]
    fn leaf_and_branch_do_not_mix() {
        let mut c = Conditions::new();
        c.set_values("a.b", &[1.0]).unwrap();
        assert!(matches!(
            c.deep_set("a", Series::scalar(0.0)),
            Err(StateError::NotALeaf { .. })
        ));
        assert!(matches!(
            c.deep_set("a.b.c", Series::scalar(0.0)),
            Err(StateError::NotABranch { .. })
        ));
    }

    #[test]
    fn invalid_paths_rejected() {
        let c = Conditions::new();
        assert!(matches!(c.deep_get(""), Err(StateError::InvalidPath { .. })));
        assert!(matches!(c.deep_get("a..b"), Err(StateError::InvalidPath { .. })));
        assert!(matches!(c.deep_get("a.b"), Err(StateError::NotFound { .. })));
    }

    #[test]
    fn expand_broadcasts_single_rows_and_keeps_full_ones() {
        let mut c = Conditions::new();
        c.set_values("x", &[3.0]).unwrap();
        c.set_values("y", &[1.0, 2.0, 3.0, 4.0]).unwrap();
        c.expand(4).unwrap();
        assert_eq!(c.values("x").unwrap(), vec![3.0; 4]);
        assert_eq!(c.values("y").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn expand_rejects_inconsistent_rows() {
        let mut c = Conditions::new();
        c.set_values("a", &[1.0, 2.0]).unwrap();
        c.set_values("b", &[1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(c.expand(3), Err(StateError::InconsistentRows { .. })));
        assert!(matches!(c.expand(0), Err(StateError::ZeroRows)));
    }

    #[test]
    fn snapshot_takes_last_rows() {
        let mut c = Conditions::new();
        c.set_values("energy.bus.battery.state_of_charge", &[1.0, 0.9, 0.8])
            .unwrap();
        let snap = c.last_row_snapshot();
        let s = snap.deep_get("energy.bus.battery.state_of_charge").unwrap();
        assert_eq!(s.rows(), 1);
        assert_eq!(s.first(), 0.8);
    }

    #[test]
    fn scope_mut_writes_under_prefix() {
        let mut c = Conditions::new();
        {
            let scope = c.scope_mut("energy.bus").unwrap();
            scope.set_values("voltage", &[400.0]).unwrap();
        }
        assert_eq!(c.deep_get("energy.bus.voltage").unwrap().first(), 400.0);
    }

    #[test]
    fn remove_returns_node() {
        let mut c = Conditions::new();
        c.set_values("a.b", &[1.0]).unwrap();
        assert!(matches!(c.remove("a.b").unwrap(), Node::Leaf(_)));
        assert!(!c.contains("a.b"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn expand_gives_uniform_rows(
                firsts in proptest::collection::vec(-1e3f64..1e3, 1..6),
                n in 1usize..20,
            ) {
                let mut c = Conditions::new();
                for (i, v) in firsts.iter().enumerate() {
                    c.set_values(&format!("group.leaf{i}"), &[*v]).unwrap();
                }
                c.expand(n).unwrap();
                for (i, (_, s)) in c.leaves().into_iter().enumerate() {
                    prop_assert_eq!(s.rows(), n);
                    prop_assert!(s.values().iter().all(|x| *x == firsts[i]));
                }
            }
        }
    }
}
