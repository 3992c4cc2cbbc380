/// What a `pivot` name resolved to. Cached until the pivot is reassigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PivotKind {
    /// The live pointer selected by the object's `mouseIndex`.
    Pointer,
    /// A named path point.
    Point(String),
    /// Another entity's current start.
    Entity(String),
    /// A page-level element (controller or surface); contributes no movement.
    Element(String),
    /// The name matched nothing this frame; retried on the next stamp.
    Unresolved,
}

impl PivotKind {
    /// The keyword selecting pointer pivots.
    pub const POINTER_KEYWORD: &'static str = "mouse";

    /// Classify `name` in resolution order: pointer keyword, point, entity, element.
    pub fn classify(
        name: &str,
        is_point: impl Fn(&str) -> bool,
        is_entity: impl Fn(&str) -> bool,
        is_element: impl Fn(&str) -> bool,
    ) -> Self {
        if name == Self::POINTER_KEYWORD {
            Self::Pointer
        } else if is_point(name) {
            Self::Point(name.to_owned())
        } else if is_entity(name) {
            Self::Entity(name.to_owned())
        } else if is_element(name) {
            Self::Element(name.to_owned())
        } else {
            Self::Unresolved
        }
    }

    /// Whether the classification may be cached.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}
