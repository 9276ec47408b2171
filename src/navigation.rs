//! Sidebar navigation.
//!
//! The table is compiled in and never changes at runtime; editing an entry
//! means rebuilding the binary. Every collection renders as one sidebar
//! section, in the order of [`NAVIGATION`].
//!
//! The `check` command and the integration tests hold the table to two rules:
//! paths are unique within a collection, and every path resolves to a
//! scanned document.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// One sidebar link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationItem {
    pub name: &'static str,
    /// Route path, e.g. `/cheatsheet/basics`.
    pub path: &'static str,
    /// Display hint: the sidebar shows a "New" badge.
    pub updated: bool,
    /// Route is not backed by a content page, so completeness checks skip it.
    pub internal: bool,
}

impl NavigationItem {
    const fn page(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            updated: false,
            internal: false,
        }
    }
}

/// A named, ordered sidebar section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationCollection {
    pub key: &'static str,
    pub title: &'static str,
    pub items: &'static [NavigationItem],
}

const NAVBAR: &[NavigationItem] = &[];

const MAIN: &[NavigationItem] = &[NavigationItem::page("Getting Started", "/")];

const CHEATSHEET: &[NavigationItem] = &[
    NavigationItem::page("Basics", "/cheatsheet/basics"),
    NavigationItem::page("Control Flow", "/cheatsheet/control-flow"),
    NavigationItem::page("Functions", "/cheatsheet/functions"),
    NavigationItem::page("Arrays", "/cheatsheet/arrays"),
    NavigationItem::page("Array Methods", "/cheatsheet/array-methods"),
    NavigationItem::page("String Manipulation", "/cheatsheet/manipulating-strings"),
    NavigationItem::page("String Formatting", "/cheatsheet/string-formatting"),
    NavigationItem::page("Regular Expressions", "/cheatsheet/regular-expressions"),
    NavigationItem::page("Files and Directories", "/cheatsheet/directory-files"),
    NavigationItem::page("Error Handling", "/cheatsheet/error-handling"),
    NavigationItem::page("Debugging", "/cheatsheet/debugging"),
];

const OOPS: &[NavigationItem] = &[
    NavigationItem::page("Basics", "/oops/oopsbasics"),
    NavigationItem::page("Class", "/oops/class"),
    NavigationItem::page("Object", "/oops/object"),
    NavigationItem::page("Abstraction", "/oops/abstraction"),
    NavigationItem::page("Encapsulation", "/oops/encapsulation"),
    NavigationItem::page("Inheritence", "/oops/inheritence"),
    NavigationItem::page("Polymorphism", "/oops/polymorphism"),
];

const COLLECTION: &[NavigationItem] = &[
    NavigationItem::page("Basics", "/collection/basics"),
    NavigationItem::page("List", "/collection/list"),
    NavigationItem::page("Set", "/collection/set"),
    NavigationItem::page("Stack", "/collection/stack"),
    NavigationItem::page("LinkedList", "/collection/linkedlist"),
    NavigationItem::page("Queue", "/collection/queue"),
    NavigationItem::page("Map", "/collection/map"),
    NavigationItem::page("Deque", "/collection/deque"),
    NavigationItem::page("SortedSet", "/collection/sortedset"),
];

const MULTITHREAD: &[NavigationItem] = &[NavigationItem::page("Basics", "/multithread/basics")];

/// All sidebar sections, in display order.
pub const NAVIGATION: &[NavigationCollection] = &[
    NavigationCollection {
        key: "navbar",
        title: "Navbar",
        items: NAVBAR,
    },
    NavigationCollection {
        key: "main",
        title: "Getting Started",
        items: MAIN,
    },
    NavigationCollection {
        key: "cheatsheet",
        title: "Cheatsheet",
        items: CHEATSHEET,
    },
    NavigationCollection {
        key: "oops",
        title: "OOP",
        items: OOPS,
    },
    NavigationCollection {
        key: "collection",
        title: "Collections",
        items: COLLECTION,
    },
    NavigationCollection {
        key: "multithread",
        title: "Multithreading",
        items: MULTITHREAD,
    },
];

pub fn collections() -> &'static [NavigationCollection] {
    NAVIGATION
}

pub fn collection(key: &str) -> Option<&'static NavigationCollection> {
    NAVIGATION.iter().find(|c| c.key == key)
}

/// First item whose path is `route`, with the collection it belongs to.
pub fn current(route: &str) -> Option<(&'static NavigationCollection, &'static NavigationItem)> {
    NAVIGATION.iter().find_map(|c| {
        c.items
            .iter()
            .find(|item| item.path == route)
            .map(|item| (c, item))
    })
}

/// Previous and next items around `route` within its collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub prev: Option<&'static NavigationItem>,
    pub next: Option<&'static NavigationItem>,
}

pub fn neighbors(route: &str) -> Neighbors {
    let Some((collection, _)) = current(route) else {
        return Neighbors::default();
    };
    let items = collection.items;
    let Some(pos) = items.iter().position(|item| item.path == route) else {
        return Neighbors::default();
    };
    Neighbors {
        prev: pos.checked_sub(1).and_then(|i| items.get(i)),
        next: items.get(pos + 1),
    }
}

/// A rule the navigation table breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIssue {
    /// Same path listed twice in one collection.
    DuplicatePath {
        collection: &'static str,
        path: &'static str,
    },
    /// Path with no document behind it.
    MissingRoute {
        collection: &'static str,
        name: &'static str,
        path: &'static str,
    },
}

impl std::fmt::Display for NavigationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePath { collection, path } => {
                write!(f, "{collection}: {path} is listed more than once")
            }
            Self::MissingRoute {
                collection,
                name,
                path,
            } => write!(f, "{collection}: \"{name}\" points at {path}, which has no page"),
        }
    }
}

pub fn duplicate_paths(collections: &[NavigationCollection]) -> Vec<NavigationIssue> {
    let mut issues = Vec::new();
    for c in collections {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for item in c.items {
            if !seen.insert(item.path) && reported.insert(item.path) {
                issues.push(NavigationIssue::DuplicatePath {
                    collection: c.key,
                    path: item.path,
                });
            }
        }
    }
    issues
}

/// Items whose path is not in `routes`. Internal items are skipped.
pub fn missing_routes(
    collections: &[NavigationCollection],
    routes: &BTreeSet<String>,
) -> Vec<NavigationIssue> {
    collections
        .iter()
        .flat_map(|c| c.items.iter().map(move |item| (c, item)))
        .filter(|(_, item)| !item.internal && !routes.contains(item.path))
        .map(|(c, item)| NavigationIssue::MissingRoute {
            collection: c.key,
            name: item.name,
            path: item.path,
        })
        .collect()
}

/// Run every navigation check against the scanned routes.
pub fn check(routes: &BTreeSet<String>) -> Vec<NavigationIssue> {
    let mut issues = duplicate_paths(NAVIGATION);
    issues.extend(missing_routes(NAVIGATION, routes));
    issues
}
