use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// The top-level link list opened by the hamburger control
    Root,
    /// Panel owned by a top-level link
    Dropdown,
    /// Panel owned by a link inside another panel
    Submenu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: PanelId,
    pub kind: PanelKind,
    pub parent: Option<PanelId>,
    pub active: bool,
    pub has_back_control: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub label: String,
    pub href: String,
    /// Panel the link is rendered in
    pub panel: PanelId,
    /// Panel the link opens, if it has children
    pub submenu: Option<PanelId>,
}

/// Navigation markup description, e.g. loaded from a site's nav JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub children: Vec<NavItem>,
}

impl NavItem {
    pub fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NavItem>) -> Self {
        self.children = children;
        self
    }
}

/// Arena of menu panels and links plus page-level menu flags.
/// `MenuTree::default()` is a page without a navigation container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuTree {
    panels: Vec<Panel>,
    links: Vec<Link>,
    /// Body-level lock preventing background scrolling
    pub scroll_locked: bool,
    pub back_controls_hidden: bool,
}

impl MenuTree {
    pub fn from_items(items: &[NavItem]) -> Self {
        let mut tree = Self::default();
        let root = tree.add_panel(PanelKind::Root, None);
        tree.add_items(items, root);
        tree
    }

    fn add_panel(&mut self, kind: PanelKind, parent: Option<PanelId>) -> PanelId {
        let id = PanelId(self.panels.len());
        self.panels.push(Panel {
            id,
            kind,
            parent,
            active: false,
            has_back_control: false,
        });
        id
    }

    fn add_items(&mut self, items: &[NavItem], panel: PanelId) {
        let parent_is_root = self.panel(panel).is_some_and(|p| p.kind == PanelKind::Root);
        let child_kind = if parent_is_root {
            PanelKind::Dropdown
        } else {
            PanelKind::Submenu
        };
        for item in items {
            let id = LinkId(self.links.len());
            self.links.push(Link {
                id,
                label: item.label.clone(),
                href: item.href.clone(),
                panel,
                submenu: None,
            });
            if !item.children.is_empty() {
                let sub = self.add_panel(child_kind, Some(panel));
                self.links[id.0].submenu = Some(sub);
                self.add_items(&item.children, sub);
            }
        }
    }

    pub fn root(&self) -> Option<PanelId> {
        self.panels
            .iter()
            .find(|p| p.kind == PanelKind::Root)
            .map(|p| p.id)
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(id.0)
    }

    pub(crate) fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(id.0)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn find_link(&self, label: &str) -> Option<LinkId> {
        self.links.iter().find(|l| l.label == label).map(|l| l.id)
    }

    /// `id` followed by its parent chain up to the root.
    pub fn chain(&self, id: PanelId) -> Vec<PanelId> {
        let mut chain = Vec::new();
        let mut current = self.panel(id);
        while let Some(panel) = current {
            chain.push(panel.id);
            current = panel.parent.and_then(|p| self.panel(p));
        }
        chain
    }

    pub fn is_descendant_of(&self, id: PanelId, ancestor: PanelId) -> bool {
        self.chain(id).iter().skip(1).any(|&p| p == ancestor)
    }

    pub fn is_active(&self, id: PanelId) -> bool {
        self.panel(id).is_some_and(|p| p.active)
    }

    pub fn any_active(&self) -> bool {
        self.panels.iter().any(|p| p.active)
    }

    pub fn active_panels(&self) -> Vec<PanelId> {
        self.panels.iter().filter(|p| p.active).map(|p| p.id).collect()
    }

    /// Put a back control at the top of every nested panel that lacks one.
    /// Returns the number of controls added.
    pub fn inject_back_controls(&mut self) -> usize {
        let mut injected = 0;
        for panel in self.panels.iter_mut().filter(|p| p.kind != PanelKind::Root) {
            if !panel.has_back_control {
                panel.has_back_control = true;
                injected += 1;
            }
        }
        injected
    }
}
