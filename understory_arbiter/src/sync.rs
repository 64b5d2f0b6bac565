// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutex-backed resolver for callers that query from several threads.
//!
//! ## Feature
//!
//! Enable with `std`.
//!
//! A plain [`Resolver`] checks the fingerprint, looks up the key and stores a freshly
//! computed winner as separate steps. [`SharedResolver`] holds one lock across the whole
//! sequence so two threads cannot both compute and store a winner for the same window.

use core::fmt;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::ranking::Ranking;
use crate::resolver::Resolver;
use crate::types::{ComponentTree, FingerprintSources, Orderable, ResolverStats};

/// A [`Resolver`] behind a [`Mutex`].
pub struct SharedResolver<K, H, R> {
    inner: Mutex<Resolver<K, H, R>>,
}

impl<K, H, R> fmt::Debug for SharedResolver<K, H, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedResolver")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<K, H, R> From<Resolver<K, H, R>> for SharedResolver<K, H, R> {
    fn from(resolver: Resolver<K, H, R>) -> Self {
        Self {
            inner: Mutex::new(resolver),
        }
    }
}

impl<K, H, R> SharedResolver<K, H, R>
where
    K: Ord + Copy + fmt::Debug,
    H: Copy + Eq + fmt::Debug,
{
    /// Create a shared resolver that fingerprints the tree by node and attachment counts.
    pub fn new(ranking: R) -> Self {
        Resolver::new(ranking).into()
    }

    /// Create a shared resolver with explicit fingerprint sources.
    pub fn with_fingerprint(ranking: R, sources: FingerprintSources) -> Self {
        Resolver::with_fingerprint(ranking, sources).into()
    }

    /// See [`Resolver::has_conflict`].
    pub fn has_conflict<C, T>(&self, tree: &T, component: H, key: K) -> bool
    where
        T: ComponentTree<C, Handle = H>,
        C: Orderable<K>,
        R: Ranking<H, C>,
    {
        self.lock().has_conflict(tree, component, key)
    }

    /// See [`Resolver::winner`].
    pub fn winner<C, T>(&self, tree: &T, component: H, key: K) -> Option<H>
    where
        T: ComponentTree<C, Handle = H>,
        C: Orderable<K>,
        R: Ranking<H, C>,
    {
        self.lock().winner(tree, component, key)
    }

    /// Drop every cached winner.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Activity counters.
    pub fn stats(&self) -> ResolverStats {
        self.lock().stats()
    }

    /// Lock the inner resolver.
    ///
    /// A poisoned lock is recovered and its cache dropped, since any cached state
    /// can be recomputed from the tree.
    pub fn lock(&self) -> MutexGuard<'_, Resolver<K, H, R>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("resolver lock was poisoned; dropping cache");
            self.inner.clear_poison();
            let mut guard = poisoned.into_inner();
            guard.clear();
            guard
        })
    }

    /// Consume the wrapper and return the inner resolver.
    pub fn into_inner(self) -> Resolver<K, H, R> {
        self.inner
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
