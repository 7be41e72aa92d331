use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt::Display;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;

use crate::errors::Error;

/// Serialized form of one component: text when it is valid UTF-8, raw bytes
/// otherwise.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Component {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&OsStr> for Component {
    fn from(c: &OsStr) -> Self {
        match c.to_str() {
            Some(s) => Component::Text(s.to_owned()),
            None => Component::Bytes(c.as_encoded_bytes().to_vec()),
        }
    }
}

impl From<Component> for OsString {
    fn from(c: Component) -> Self {
        match c {
            Component::Text(s) => s.into(),
            Component::Bytes(b) => os_string_from_bytes(b),
        }
    }
}

#[cfg(unix)]
fn os_string_from_bytes(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn os_string_from_bytes(bytes: Vec<u8>) -> OsString {
    String::from_utf8_lossy(&bytes).into_owned().into()
}

fn serialize_components<S>(components: &[OsString], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(components.iter().map(|c| Component::from(c.as_os_str())))
}

/// A custom deserializer function for the components that checks for ".",
/// ".." and separator-carrying components.
fn deserialize_components<'de, D>(deserializer: D) -> Result<Vec<OsString>, D::Error>
where
    D: Deserializer<'de>,
{
    let components: Vec<OsString> = Vec::<Component>::deserialize(deserializer)?
        .into_iter()
        .map(OsString::from)
        .collect();

    if components.iter().any(|c| !is_valid_component(c)) {
        Err(de::Error::custom(
            "Path component cannot be empty, '.', '..' or contain '/'",
        ))
    } else {
        Ok(components)
    }
}

fn is_valid_component(c: &OsStr) -> bool {
    let bytes = c.as_encoded_bytes();
    !(bytes.is_empty() || bytes == b"." || bytes == b".." || bytes.contains(&b'/'))
}

/// Path of a walked entry relative to the traversal root.
///
/// Components keep the raw file names, so names that are not valid UTF-8
/// stay distinct and order by their bytes. The root itself has no components
/// and displays as `.`. Every other path displays as its components joined
/// with `/`, regardless of the platform separator; display is lossy for
/// non-UTF-8 names. The number of components is the entry's depth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq, PartialOrd, Ord)]
pub struct RelPath {
    #[serde(
        serialize_with = "serialize_components",
        deserialize_with = "deserialize_components"
    )]
    components: Vec<OsString>,
}

impl Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.components.is_empty() {
            return write!(f, ".");
        }
        for (i, comp) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", comp.to_string_lossy())?;
        }
        Ok(())
    }
}

impl RelPath {
    /// Path of the traversal root, `.`.
    pub fn root() -> Self {
        Self { components: vec![] }
    }

    /// Whether this is the traversal root.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of traversal steps from the root. The root is depth 0.
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Returns the last component, or `None` for the root.
    pub fn basename(&self) -> Option<&OsStr> {
        self.components.last().map(|s| s.as_os_str())
    }

    /// The `/`-joined path with the raw names, `.` for the root.
    pub fn to_os_string(&self) -> OsString {
        if self.components.is_empty() {
            return OsString::from(".");
        }
        let mut ret = OsString::new();
        for (i, comp) in self.components.iter().enumerate() {
            if i > 0 {
                ret.push("/");
            }
            ret.push(comp);
        }
        ret
    }

    /// Returns the path of a child named `name` below this one.
    pub(crate) fn child(&self, name: &OsStr) -> Self {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.extend(self.components.iter().cloned());
        components.push(name.to_owned());
        Self { components }
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<RelPath> {
        if self.components.is_empty() {
            None
        } else {
            let mut parent_components = self.components.clone();
            parent_components.pop();
            Some(RelPath {
                components: parent_components,
            })
        }
    }
}

impl<T> TryFrom<&[T]> for RelPath
where
    T: AsRef<OsStr>,
{
    type Error = Error;

    /// Attempt to build a `RelPath` from a slice of components.
    ///
    /// Each component must be non-empty, must not contain `/`, and must not be
    /// `.` or `..`.
    fn try_from(components: &[T]) -> std::result::Result<Self, Self::Error> {
        let mut c = Vec::with_capacity(components.len());
        for comp in components {
            let s = comp.as_ref();
            if !is_valid_component(s) {
                return Err(Error::InvalidArgument(format!(
                    "Invalid path component: {}",
                    s.to_string_lossy()
                )));
            }
            c.push(s.to_owned());
        }
        Ok(RelPath { components: c })
    }
}

impl TryFrom<&str> for RelPath {
    type Error = Error;

    /// Parse a `/`-separated relative path. `.` parses as the root.
    fn try_from(path: &str) -> Result<Self, Self::Error> {
        if path == "." {
            return Ok(Self::root());
        }
        let parts: Vec<&str> = path.split('/').collect();
        Self::try_from(parts.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use crate::RelPath;

    #[test]
    fn root_path_display() {
        assert_eq!(RelPath::root().to_string(), ".");
        assert_eq!(RelPath::root().to_os_string(), ".");
        assert!(RelPath::root().is_root());
        assert_eq!(RelPath::root().depth(), 0);
    }

    #[test]
    fn nested_path_display() {
        let path = RelPath::try_from("etc/certs/ca.crt").unwrap();
        assert_eq!(path.to_string(), "etc/certs/ca.crt");
        assert_eq!(path.to_os_string(), "etc/certs/ca.crt");
        assert_eq!(path.depth(), 3);
        assert_eq!(path.basename(), Some(OsStr::new("ca.crt")));
        assert_eq!(path.parent().unwrap().to_string(), "etc/certs");
        assert_eq!(
            RelPath::root().child(OsStr::new("etc")),
            RelPath::try_from("etc").unwrap()
        );
    }

    #[test]
    fn parse_rejects_dot_components() {
        assert!(RelPath::try_from("a/../b").is_err());
        assert!(RelPath::try_from("a//b").is_err());
        assert_eq!(RelPath::try_from(".").unwrap(), RelPath::root());
        assert_eq!(RelPath::try_from("usr/bin").unwrap().to_string(), "usr/bin");
    }

    #[test]
    fn deserialize_rejects_parent_component() {
        let res: Result<RelPath, _> = serde_json::from_str(r#"{"components":["..","x"]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn serializes_utf8_components_as_text() {
        let path = RelPath::try_from("src/lib.rs").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"{"components":["src","lib.rs"]}"#);
        assert_eq!(serde_json::from_str::<RelPath>(&json).unwrap(), path);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_components_stay_distinct() {
        use std::os::unix::ffi::OsStrExt;

        let a = RelPath::root().child(OsStr::from_bytes(b"a\xfe"));
        let b = RelPath::root().child(OsStr::from_bytes(b"a\xff"));
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
        assert!(a < b);

        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#"{"components":[[97,255]]}"#);
        assert_eq!(serde_json::from_str::<RelPath>(&json).unwrap(), b);
    }
}
