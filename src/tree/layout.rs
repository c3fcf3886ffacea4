//! Declarative layout nodes handed to the tree model on every refresh.
//!
//! A [`LayoutNode`] is cheap to rebuild: providers produce a fresh forest each
//! time they are asked, and the [`TreeModel`](super::TreeModel) carries runtime
//! state (expansion, loaded children) across rebuilds by matching ids.

use std::fmt;
use std::rc::Rc;

use crate::drawer::Continuation;

/// Produces the children of a lazy node on demand.
///
/// Called synchronously while expanding or reconciling. Expensive work should
/// be started in the background and reported through a [`Continuation`].
pub trait ChildrenProvider {
    fn children(&self) -> anyhow::Result<Vec<LayoutNode>>;
}

impl<F> ChildrenProvider for F
where
    F: Fn() -> anyhow::Result<Vec<LayoutNode>>,
{
    fn children(&self) -> anyhow::Result<Vec<LayoutNode>> {
        self()
    }
}

impl fmt::Debug for dyn ChildrenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChildrenProvider(..)")
    }
}

/// Produces the entries of a selection prompt on demand.
pub trait PickItemsProvider {
    fn items(&self) -> anyhow::Result<Vec<String>>;
}

impl<F> PickItemsProvider for F
where
    F: Fn() -> anyhow::Result<Vec<String>>,
{
    fn items(&self) -> anyhow::Result<Vec<String>> {
        self()
    }
}

/// Any collaborator that contributes a section of the drawer forest.
pub trait LayoutProvider {
    /// Return the current forest. Must return promptly.
    fn layout(&self) -> Vec<LayoutNode>;

    /// Drop cached state so later layouts go back to the source. Called
    /// before a refresh the user asked for.
    fn invalidate(&self) {}
}

impl<F> LayoutProvider for F
where
    F: Fn() -> Vec<LayoutNode>,
{
    fn layout(&self) -> Vec<LayoutNode> {
        self()
    }
}

/// Children of a layout node: either known up front or produced lazily.
#[derive(Clone)]
pub enum Children {
    Eager(Vec<LayoutNode>),
    Lazy(Rc<dyn ChildrenProvider>),
}

impl Default for Children {
    fn default() -> Self {
        Self::Eager(Vec::new())
    }
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager(children) => f.debug_tuple("Eager").field(children).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Items offered by the selection prompt before an action runs.
#[derive(Clone)]
pub enum PickItems {
    Static(Vec<String>),
    Provider(Rc<dyn PickItemsProvider>),
}

impl PickItems {
    pub fn provider<F>(items: F) -> Self
    where
        F: Fn() -> anyhow::Result<Vec<String>> + 'static,
    {
        Self::Provider(Rc::new(items))
    }

    /// Resolve the list, invoking the provider if there is one.
    pub fn resolve(&self) -> anyhow::Result<Vec<String>> {
        match self {
            Self::Static(items) => Ok(items.clone()),
            Self::Provider(provider) => provider.items(),
        }
    }
}

impl fmt::Debug for PickItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(items) => f.debug_tuple("Static").field(items).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

impl From<Vec<String>> for PickItems {
    fn from(items: Vec<String>) -> Self {
        Self::Static(items)
    }
}

impl From<&[&str]> for PickItems {
    fn from(items: &[&str]) -> Self {
        Self::Static(items.iter().map(|item| (*item).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PickItems {
    fn from(items: [&str; N]) -> Self {
        Self::from(&items[..])
    }
}

type ImmediateFn = dyn Fn(Continuation) -> anyhow::Result<()>;
type SelectionFn = dyn Fn(Continuation, Option<String>) -> anyhow::Result<()>;

/// A node-scoped operation bound to one of the three action slots.
///
/// Whether the action takes a selection is fixed when the action is built, so
/// the dispatcher never has to guess from the handler's shape.
#[derive(Clone)]
pub enum NodeAction {
    /// Runs right away with only a continuation.
    Immediate(Rc<ImmediateFn>),
    /// Wants the user's pick when the node declares pick items. Receives `None`
    /// when there is nothing to pick from.
    WithSelection(Rc<SelectionFn>),
}

impl NodeAction {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(Continuation) -> anyhow::Result<()> + 'static,
    {
        Self::Immediate(Rc::new(handler))
    }

    pub fn with_selection<F>(handler: F) -> Self
    where
        F: Fn(Continuation, Option<String>) -> anyhow::Result<()> + 'static,
    {
        Self::WithSelection(Rc::new(handler))
    }

    pub fn wants_selection(&self) -> bool {
        matches!(self, Self::WithSelection(_))
    }

    pub(crate) fn call(&self, done: Continuation, selection: Option<String>) -> anyhow::Result<()> {
        match self {
            Self::Immediate(handler) => handler(done),
            Self::WithSelection(handler) => handler(done, selection),
        }
    }
}

impl fmt::Debug for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(_) => f.write_str("Immediate(..)"),
            Self::WithSelection(_) => f.write_str("WithSelection(..)"),
        }
    }
}

/// One of the three independently bound action slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionSlot {
    First,
    Second,
    Third,
}

impl ActionSlot {
    pub const ALL: [ActionSlot; 3] = [ActionSlot::First, ActionSlot::Second, ActionSlot::Third];

    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }
}

impl fmt::Display for ActionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action_{}", self.index() + 1)
    }
}

/// Theming tag for a node. Never used for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    #[default]
    None,
    Connection,
    Schema,
    Table,
    View,
    History,
    Call,
    Scratch,
    Add,
    Edit,
    Remove,
    Help,
    Separator,
}

impl NodeType {
    /// Key used to look the type up in the theme.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Connection => "connection",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::View => "view",
            Self::History => "history",
            Self::Call => "call",
            Self::Scratch => "scratch",
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Remove => "remove",
            Self::Help => "help",
            Self::Separator => "separator",
        }
    }
}

/// One-shot auto-expand request, identified by a caller-supplied key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOnce {
    key: String,
}

impl ExpandOnce {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Declarative description of one forest entry.
#[derive(Debug, Clone, Default)]
pub struct LayoutNode {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    pub schema: Option<String>,
    pub database: Option<String>,
    pub children: Children,
    pub pick_title: Option<String>,
    pub pick_items: Option<PickItems>,
    pub actions: [Option<NodeAction>; 3],
    pub default_expand: Option<ExpandOnce>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn children(mut self, children: Vec<LayoutNode>) -> Self {
        self.children = Children::Eager(children);
        self
    }

    /// Mark the node lazy; `getter` runs whenever the node is expanded.
    pub fn lazy_children<F>(mut self, getter: F) -> Self
    where
        F: Fn() -> anyhow::Result<Vec<LayoutNode>> + 'static,
    {
        self.children = Children::Lazy(Rc::new(getter));
        self
    }

    pub fn pick(mut self, title: impl Into<String>, items: impl Into<PickItems>) -> Self {
        self.pick_title = Some(title.into());
        self.pick_items = Some(items.into());
        self
    }

    pub fn action(mut self, slot: ActionSlot, action: NodeAction) -> Self {
        self.actions[slot.index()] = Some(action);
        self
    }

    pub fn expand_once(mut self, key: impl Into<String>) -> Self {
        self.default_expand = Some(ExpandOnce::new(key));
        self
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.children, Children::Lazy(_))
    }
}

/// Replace newlines so a name always fits on one display line.
pub(crate) fn normalize_name(name: &str) -> String {
    name.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
