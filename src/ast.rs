use std::fmt;

use crate::element::Element;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document(Vec<Node>),
    /// Unescaped text, emitted verbatim.
    Text(String),
    ForLoop(ForLoop),
    /// Tag body elements in source order, evaluated only when executed.
    Echo(Vec<Element>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub variable: String,
    pub start: Element,
    pub end: Element,
    /// Integer `1` when absent.
    pub step: Option<Element>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document(children) => children,
            Node::ForLoop(for_loop) => &for_loop.children,
            Node::Text(_) | Node::Echo(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document(children) => Some(children),
            Node::ForLoop(for_loop) => Some(&mut for_loop.children),
            Node::Text(_) | Node::Echo(_) => None,
        }
    }
}

/// Re-emits template source that parses back to an equal tree.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Document(children) => children.iter().try_for_each(|child| write!(f, "{child}")),
            Node::Text(text) => {
                for c in text.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '{' => f.write_str("\\{")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                Ok(())
            }
            Node::ForLoop(for_loop) => {
                write!(f, "{{$ FOR {} {} {}", for_loop.variable, for_loop.start, for_loop.end)?;
                if let Some(step) = &for_loop.step {
                    write!(f, " {step}")?;
                }
                f.write_str(" $}")?;
                for child in &for_loop.children {
                    write!(f, "{child}")?;
                }
                f.write_str("{$END$}")
            }
            Node::Echo(elements) => {
                f.write_str("{$=")?;
                for element in elements {
                    write!(f, " {element}")?;
                }
                f.write_str(" $}")
            }
        }
    }
}
