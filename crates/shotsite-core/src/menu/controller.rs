use tracing::debug;

use super::tree::{LinkId, MenuTree, PanelId, PanelKind};

/// Viewports at or below this width use drill-down navigation.
pub const DEFAULT_BREAKPOINT_PX: u32 = 992;

/// Links carrying this marker select a catalog category.
pub const CATEGORY_FILTER_MARKER: &str = "?cat=";

/// What the click landed on, resolved by the page from the event target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Hamburger control
    Toggle,
    /// Back control at the top of the given panel
    Back(PanelId),
    Link(LinkId),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Click {
        target: ClickTarget,
        viewport_width: u32,
    },
    Resize {
        viewport_width: u32,
    },
}

/// How the page should treat the event after the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not intercepted; default handling proceeds
    Default,
    /// Default handling suppressed
    Consumed,
    /// Default handling suppressed; assign the location directly
    Navigate(String),
}

pub fn is_narrow(viewport_width: u32, breakpoint: u32) -> bool {
    viewport_width <= breakpoint
}

/// Apply one event to the menu. Pure: the page renders `tree'` and acts on
/// the returned `Outcome`. Targets that do not exist in the tree are no-ops.
pub fn transition(tree: MenuTree, event: &MenuEvent, breakpoint: u32) -> (MenuTree, Outcome) {
    match *event {
        MenuEvent::Resize { viewport_width } => (apply_viewport(tree, viewport_width, breakpoint), Outcome::Default),
        MenuEvent::Click { target, viewport_width } => match target {
            ClickTarget::Toggle => toggle(tree),
            ClickTarget::Back(panel) => back(tree, panel),
            ClickTarget::Link(link) => follow_link(tree, link, is_narrow(viewport_width, breakpoint)),
            ClickTarget::Other => (tree, Outcome::Default),
        },
    }
}

fn toggle(mut tree: MenuTree) -> (MenuTree, Outcome) {
    let Some(root) = tree.root() else {
        return (tree, Outcome::Consumed);
    };

    if tree.is_active(root) {
        close_all(&mut tree);
    } else if let Some(panel) = tree.panel_mut(root) {
        panel.active = true;
    }
    tree.scroll_locked = tree.any_active();
    (tree, Outcome::Consumed)
}

fn back(mut tree: MenuTree, panel: PanelId) -> (MenuTree, Outcome) {
    let Some(current) = tree.panel(panel).cloned() else {
        return (tree, Outcome::Consumed);
    };
    if !current.active || current.kind == PanelKind::Root {
        return (tree, Outcome::Consumed);
    }

    deactivate_subtree(&mut tree, panel);

    // Step back exactly one level: keep the parent chain open
    if current.kind == PanelKind::Submenu {
        if let Some(parent) = current.parent {
            activate_chain(&mut tree, parent);
        }
    }

    tree.scroll_locked = tree.any_active();
    (tree, Outcome::Consumed)
}

fn follow_link(mut tree: MenuTree, link: LinkId, narrow: bool) -> (MenuTree, Outcome) {
    let Some(link) = tree.link(link).cloned() else {
        return (tree, Outcome::Default);
    };

    if let Some(submenu) = link.submenu {
        if narrow {
            activate_chain(&mut tree, submenu);
            tree.scroll_locked = true;
            return (tree, Outcome::Consumed);
        }
        let is_top_level = tree
            .panel(link.panel)
            .is_some_and(|p| p.kind == PanelKind::Root);
        if is_top_level {
            return (tree, Outcome::Navigate(link.href));
        }
    }

    if link.href.contains(CATEGORY_FILTER_MARKER) {
        return (tree, Outcome::Navigate(link.href));
    }
    (tree, Outcome::Default)
}

/// Wide viewports never show back controls and never lock scrolling.
fn apply_viewport(mut tree: MenuTree, viewport_width: u32, breakpoint: u32) -> MenuTree {
    if is_narrow(viewport_width, breakpoint) {
        tree.back_controls_hidden = false;
    } else {
        tree.back_controls_hidden = true;
        tree.scroll_locked = false;
    }
    tree
}

/// Make `panel` and its ancestors the only active chain.
fn activate_chain(tree: &mut MenuTree, panel: PanelId) {
    let chain = tree.chain(panel);
    let ids: Vec<PanelId> = tree.panels().iter().map(|p| p.id).collect();
    for id in ids {
        let active = chain.contains(&id);
        if let Some(p) = tree.panel_mut(id) {
            p.active = active;
        }
    }
}

fn deactivate_subtree(tree: &mut MenuTree, panel: PanelId) {
    let ids: Vec<PanelId> = tree
        .panels()
        .iter()
        .map(|p| p.id)
        .filter(|&id| id == panel || tree.is_descendant_of(id, panel))
        .collect();
    for id in ids {
        if let Some(p) = tree.panel_mut(id) {
            p.active = false;
        }
    }
}

fn close_all(tree: &mut MenuTree) {
    let ids: Vec<PanelId> = tree.panels().iter().map(|p| p.id).collect();
    for id in ids {
        if let Some(p) = tree.panel_mut(id) {
            p.active = false;
        }
    }
}

/// Single delegated entry point for all menu events on a page.
#[derive(Debug, Clone)]
pub struct MenuController {
    tree: MenuTree,
    breakpoint: u32,
}

impl MenuController {
    pub fn new(tree: MenuTree, breakpoint: u32) -> Self {
        Self { tree, breakpoint }
    }

    /// First-load setup: inject back controls, then apply the viewport check.
    /// Safe to call more than once.
    pub fn init(&mut self, viewport_width: u32) -> usize {
        let injected = self.tree.inject_back_controls();
        debug!(injected, viewport_width, "Menu initialized");
        self.dispatch(MenuEvent::Resize { viewport_width });
        injected
    }

    pub fn dispatch(&mut self, event: MenuEvent) -> Outcome {
        let tree = std::mem::take(&mut self.tree);
        let (next, outcome) = transition(tree, &event, self.breakpoint);
        self.tree = next;
        debug!(?event, ?outcome, locked = self.tree.scroll_locked, "Menu event");
        outcome
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn breakpoint(&self) -> u32 {
        self.breakpoint
    }
}
