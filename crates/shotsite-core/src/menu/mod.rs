//! Drill-down navigation menu.
//!
//! On narrow viewports nested menu levels are shown one panel at a time:
//! a link that owns a submenu drills into it, and every nested panel carries
//! an injected "back" control that steps out one level. Wide viewports use
//! the ordinary hover layout, so drill-down state is bypassed there.
//!
//! The menu is modelled as a `MenuTree` of panels with parent back-references.
//! `transition` is a pure function from `(tree, event)` to the next tree
//! plus an `Outcome` telling the page what to do with the click.
//! `MenuController` wraps it behind a single delegated entry point.

pub mod controller;
pub mod tree;

pub use controller::{
    is_narrow, transition, ClickTarget, MenuController, MenuEvent, Outcome,
    CATEGORY_FILTER_MARKER, DEFAULT_BREAKPOINT_PX,
};
pub use tree::{Link, LinkId, MenuTree, NavItem, Panel, PanelId, PanelKind};
