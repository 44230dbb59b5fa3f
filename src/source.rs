//! Reading and writing template text.
//!
//! Exported templates may carry `//` and `/* */` comments, which plain JSON does
//! not allow. A scan over the text records each comment against the node it sits
//! next to and blanks it out, keeping newlines so `serde_json` errors still point
//! at the right line. [`serialize`] writes the comments back beside the same nodes.

use crate::document::NodePath;
use crate::error::TransformError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Comments attached to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    /// Comments on their own lines before the node.
    pub leading: Vec<String>,
    /// Comments on the same line after the node. At the root: everything after the document.
    pub trailing: Vec<String>,
    /// Comments inside an object or array after its last member.
    pub dangling: Vec<String>,
}

impl Trivia {
    fn len(&self) -> usize {
        self.leading.len() + self.trailing.len() + self.dangling.len()
    }

    fn into_comments(self) -> impl Iterator<Item = String> {
        self.leading
            .into_iter()
            .chain(self.trailing)
            .chain(self.dangling)
    }
}

/// Every comment of a template, keyed by the path of the node it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments(BTreeMap<NodePath, Trivia>);

impl Comments {
    pub fn get(&self, path: &NodePath) -> Option<&Trivia> {
        self.0.get(path)
    }

    /// Number of comments.
    pub fn len(&self) -> usize {
        self.0.values().map(Trivia::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&mut self, path: &NodePath) -> &mut Trivia {
        self.0.entry(path.clone()).or_default()
    }

    fn take(&mut self, path: &NodePath) -> Trivia {
        self.0.remove(path).unwrap_or_default()
    }

    /// Removes the comments of every node below `ancestor`, in path order.
    fn take_within(&mut self, ancestor: &NodePath) -> Vec<String> {
        let paths: Vec<NodePath> = self
            .0
            .keys()
            .filter(|path| path.is_within(ancestor))
            .cloned()
            .collect();
        paths
            .iter()
            .flat_map(|path| self.take(path).into_comments())
            .collect()
    }
}

/// Parses template text, tolerating comments outside string literals.
pub fn parse(text: &str) -> Result<(Value, Comments), TransformError> {
    let scan = Scanner::new(text).run()?;
    let root = serde_json::from_str(&scan.stripped)?;
    Ok((root, scan.comments))
}

/// Replaces every comment with spaces, preserving line breaks and string contents.
pub fn strip_comments(text: &str) -> Result<String, TransformError> {
    Ok(Scanner::new(text).run()?.stripped)
}

/// Serializes a tree with two-space indentation and `"key": value` spacing,
/// writing each comment next to the node it was read with.
///
/// Comments whose node no longer exists are written at the end of the closest
/// surviving container.
pub fn serialize(root: &Value, comments: &Comments) -> Result<String, TransformError> {
    let mut writer = Writer {
        out: String::new(),
        comments: comments.clone(),
    };
    let root_path = NodePath::root();
    let Trivia {
        leading,
        trailing,
        dangling,
    } = writer.comments.take(&root_path);

    for comment in leading {
        writer.out.push_str(&comment);
        writer.out.push('\n');
    }
    writer.value(root, &root_path, 0, dangling)?;
    for comment in trailing {
        writer.out.push('\n');
        writer.out.push_str(&comment);
    }
    Ok(writer.out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Document,
    Object,
    Array,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Leading,
    Trailing,
    Dangling,
}

impl Slot {
    fn list(self, trivia: &mut Trivia) -> &mut Vec<String> {
        match self {
            Slot::Leading => &mut trivia.leading,
            Slot::Trailing => &mut trivia.trailing,
            Slot::Dangling => &mut trivia.dangling,
        }
    }
}

struct Frame {
    container: Container,
    path: NodePath,
    /// The object member whose key has been read.
    current: Option<NodePath>,
    /// The member whose value ended last, until a line break follows it.
    previous: Option<NodePath>,
    count: usize,
    expect_key: bool,
}

impl Frame {
    fn new(container: Container, path: NodePath) -> Self {
        Self {
            container,
            path,
            current: None,
            previous: None,
            count: 0,
            expect_key: true,
        }
    }
}

struct Pending {
    text: String,
    trailing_of: Option<NodePath>,
}

struct Scan {
    stripped: String,
    comments: Comments,
}

struct Scanner<'a> {
    text: &'a str,
    stripped: String,
    comments: Comments,
    frames: Vec<Frame>,
    pending: Vec<Pending>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            stripped: String::with_capacity(text.len()),
            comments: Comments::default(),
            frames: vec![Frame::new(Container::Document, NodePath::root())],
            pending: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Scan, TransformError> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let byte = bytes[pos];
            let end = match byte {
                b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                    let end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
                    self.comment(pos, end);
                    end
                }
                b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                    let end = text[pos + 2..]
                        .find("*/")
                        .map(|i| pos + 2 + i + 2)
                        .ok_or(TransformError::UnterminatedComment { offset: pos })?;
                    self.comment(pos, end);
                    end
                }
                b'"' => {
                    let end = string_end(bytes, pos);
                    self.string(pos, end);
                    end
                }
                b'{' | b'[' => {
                    self.open(byte);
                    self.stripped.push(byte as char);
                    pos + 1
                }
                b'}' | b']' => {
                    self.close();
                    self.stripped.push(byte as char);
                    pos + 1
                }
                b',' => {
                    self.top().expect_key = true;
                    self.stripped.push(',');
                    pos + 1
                }
                b'\n' => {
                    self.top().previous = None;
                    self.stripped.push('\n');
                    pos + 1
                }
                b':' => {
                    self.stripped.push(':');
                    pos + 1
                }
                b if b.is_ascii_whitespace() => {
                    self.stripped.push(b as char);
                    pos + 1
                }
                _ => {
                    let end = bytes[pos + 1..]
                        .iter()
                        .position(|&b| is_delimiter(b))
                        .map_or(bytes.len(), |i| pos + 1 + i);
                    let path = self.value_start();
                    self.value_end(path);
                    self.stripped.push_str(&text[pos..end]);
                    end
                }
            };
            pos = end;
        }

        self.flush(&NodePath::root(), Slot::Trailing);
        Ok(Scan {
            stripped: self.stripped,
            comments: self.comments,
        })
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn comment(&mut self, start: usize, end: usize) {
        let text = self.text;
        let raw = &text[start..end];
        self.stripped.extend(raw.chars().map(|c| if c == '\n' { '\n' } else { ' ' }));
        let trailing_of = self.top().previous.clone();
        self.pending.push(Pending {
            text: raw.trim_end().to_string(),
            trailing_of,
        });
    }

    fn string(&mut self, start: usize, end: usize) {
        let text = self.text;
        let raw = &text[start..end];
        self.stripped.push_str(raw);

        let frame = self.top();
        if frame.container == Container::Object && frame.expect_key {
            let key = serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.to_string());
            let path = frame.path.key(&key);
            frame.current = Some(path.clone());
            frame.previous = None;
            frame.expect_key = false;
            self.flush(&path, Slot::Leading);
        } else {
            let path = self.value_start();
            self.value_end(path);
        }
    }

    fn open(&mut self, byte: u8) {
        let path = self.value_start();
        let container = if byte == b'{' {
            Container::Object
        } else {
            Container::Array
        };
        self.frames.push(Frame::new(container, path));
    }

    fn close(&mut self) {
        if self.frames.len() == 1 {
            return;
        }
        let path = self.top().path.clone();
        self.flush(&path, Slot::Dangling);
        self.frames.pop();
        self.value_end(path);
    }

    /// The path of the value starting here. Comments read since the previous
    /// token become its leading comments.
    fn value_start(&mut self) -> NodePath {
        let frame = self.top();
        let path = match frame.container {
            Container::Document => frame.path.clone(),
            Container::Object => frame.current.clone().unwrap_or_else(|| frame.path.clone()),
            Container::Array => {
                frame.count += 1;
                frame.path.index(frame.count - 1)
            }
        };
        frame.previous = None;
        self.flush(&path, Slot::Leading);
        path
    }

    fn value_end(&mut self, path: NodePath) {
        self.top().previous = Some(path);
    }

    fn flush(&mut self, path: &NodePath, slot: Slot) {
        for pending in std::mem::take(&mut self.pending) {
            match pending.trailing_of {
                Some(owner) => self.comments.entry(&owner).trailing.push(pending.text),
                None => slot.list(self.comments.entry(path)).push(pending.text),
            }
        }
    }
}

fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace()
        || matches!(byte, b',' | b':' | b'{' | b'}' | b'[' | b']' | b'"' | b'/')
}

struct Writer {
    out: String,
    comments: Comments,
}

impl Writer {
    fn value(
        &mut self,
        value: &Value,
        path: &NodePath,
        depth: usize,
        dangling: Vec<String>,
    ) -> Result<(), TransformError> {
        match value {
            Value::Object(map) => {
                let members = map
                    .iter()
                    .map(|(key, child)| (path.key(key), Some(key.as_str()), child))
                    .collect();
                self.container(('{', '}'), members, path, depth, dangling)
            }
            Value::Array(items) => {
                let members = items
                    .iter()
                    .enumerate()
                    .map(|(index, child)| (path.index(index), None, child))
                    .collect();
                self.container(('[', ']'), members, path, depth, dangling)
            }
            scalar => {
                self.out.push_str(&serde_json::to_string(scalar)?);
                Ok(())
            }
        }
    }

    fn container(
        &mut self,
        (open, close): (char, char),
        members: Vec<(NodePath, Option<&str>, &Value)>,
        path: &NodePath,
        depth: usize,
        mut dangling: Vec<String>,
    ) -> Result<(), TransformError> {
        if members.is_empty() {
            dangling.extend(self.comments.take_within(path));
            if dangling.is_empty() {
                self.out.push(open);
                self.out.push(close);
                return Ok(());
            }
        }

        self.out.push(open);
        let last = members.len().saturating_sub(1);
        for (position, (child_path, key, child)) in members.into_iter().enumerate() {
            let trivia = self.comments.take(&child_path);
            for comment in trivia.leading {
                self.line(depth + 1);
                self.out.push_str(&comment);
            }
            self.line(depth + 1);
            if let Some(key) = key {
                self.out.push_str(&serde_json::to_string(key)?);
                self.out.push_str(": ");
            }
            self.value(child, &child_path, depth + 1, trivia.dangling)?;
            if position != last {
                self.out.push(',');
            }
            for comment in trivia.trailing {
                self.out.push(' ');
                self.out.push_str(&comment);
            }
        }

        dangling.extend(self.comments.take_within(path));
        for comment in dangling {
            self.line(depth + 1);
            self.out.push_str(&comment);
        }
        self.line(depth);
        self.out.push(close);
        Ok(())
    }

    fn line(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }
}
