//! Convention-based mapping from HTTP method + path to a remote function.
//!
//! Paths take one of the forms `/<verb>`, `/win/<id>/<verb>`,
//! `/buf/<id>/<verb>` or `/tabpage/<id>/<verb>`. The resolved name is
//! `nvim_` + namespace infix + action infix + verb, where the action infix
//! comes from the HTTP method.

use crate::error::{GatewayError, GatewayResult};
use http::Method;
use nvim_http_core::HandleArgument;

const PREFIX: &str = "nvim_";

/// Remote function name plus the handle arguments taken from the path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    pub name: String,
    pub handles: Vec<HandleArgument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Window,
    Buffer,
    Tabpage,
}

impl Namespace {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "win" => Some(Namespace::Window),
            "buf" => Some(Namespace::Buffer),
            "tabpage" => Some(Namespace::Tabpage),
            _ => None,
        }
    }

    fn infix(self) -> &'static str {
        match self {
            Namespace::Window => "win_",
            Namespace::Buffer => "buf_",
            Namespace::Tabpage => "tabpage_",
        }
    }

    fn handle(self, id: i64) -> HandleArgument {
        match self {
            Namespace::Window => HandleArgument::Window(id),
            Namespace::Buffer => HandleArgument::Buffer(id),
            Namespace::Tabpage => HandleArgument::Tabpage(id),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Namespace::Window => "window",
            Namespace::Buffer => "buffer",
            Namespace::Tabpage => "tabpage",
        }
    }
}

/// Resolve the remote function targeted by `method` and `path`
pub fn resolve(method: &Method, path: &str) -> GatewayResult<ResolvedCall> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut segments = trimmed.splitn(3, '/');
    let first = segments.next().unwrap_or_default();

    let (namespace, handles, fragment) = match Namespace::from_segment(first) {
        Some(namespace) => {
            let id = parse_handle_id(path, namespace, segments.next())?;
            (
                namespace.infix(),
                vec![namespace.handle(id)],
                segments.next().unwrap_or_default(),
            )
        }
        None => ("", Vec::new(), trimmed),
    };

    let verb: String = fragment.chars().filter(|c| *c != '/').collect();
    let action = action_infix(method, verb.is_empty());

    Ok(ResolvedCall {
        name: format!("{}{}{}{}", PREFIX, namespace, action, verb),
        handles,
    })
}

fn parse_handle_id(path: &str, namespace: Namespace, segment: Option<&str>) -> GatewayResult<i64> {
    let segment = match segment {
        Some(s) if !s.is_empty() => s,
        _ => {
            return Err(GatewayError::malformed_path(
                path,
                format!("missing {} id", namespace.label()),
            ))
        }
    };

    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::malformed_path(
            path,
            format!("invalid {} id '{}'", namespace.label(), segment),
        ));
    }

    segment.parse::<i64>().map_err(|e| {
        GatewayError::malformed_path(path, format!("invalid {} id '{}': {}", namespace.label(), segment, e))
    })
}

fn action_infix(method: &Method, verb_is_empty: bool) -> &'static str {
    match *method {
        Method::GET => "get_",
        Method::PUT => "set_",
        // `nvim_buf_delete` has no suffix after the action
        Method::DELETE if verb_is_empty => "delete",
        Method::DELETE => "del_",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(method: Method, path: &str) -> String {
        resolve(&method, path).unwrap().name
    }

    #[test]
    fn test_bare_verbs() {
        let cases = [
            (Method::GET, "get_"),
            (Method::PUT, "set_"),
            (Method::DELETE, "del_"),
            (Method::POST, ""),
            (Method::PATCH, ""),
        ];

        for (method, infix) in cases {
            for verb in ["var", "current_line", "command", "keymap"] {
                let call = resolve(&method, &format!("/{}", verb)).unwrap();
                assert_eq!(call.name, format!("nvim_{}{}", infix, verb));
                assert!(call.handles.is_empty());
            }
        }
    }

    #[test]
    fn test_get_var() {
        assert_eq!(name(Method::GET, "/var"), "nvim_get_var");
        assert_eq!(name(Method::GET, "/get_var"), "nvim_get_get_var");
    }

    #[test]
    fn test_window_set() {
        let call = resolve(&Method::PUT, "/win/7/height").unwrap();
        assert_eq!(call.name, "nvim_win_set_height");
        assert_eq!(call.handles, vec![HandleArgument::Window(7)]);
    }

    #[test]
    fn test_buffer_delete_special_case() {
        let call = resolve(&Method::DELETE, "/buf/3/").unwrap();
        assert_eq!(call.name, "nvim_buf_delete");
        assert_eq!(call.handles, vec![HandleArgument::Buffer(3)]);

        assert_eq!(name(Method::DELETE, "/buf/3"), "nvim_buf_delete");
        assert_eq!(name(Method::DELETE, "/buf/3/var"), "nvim_buf_del_var");
    }

    #[test]
    fn test_tabpage_and_post() {
        let call = resolve(&Method::GET, "/tabpage/12/win").unwrap();
        assert_eq!(call.name, "nvim_tabpage_get_win");
        assert_eq!(call.handles, vec![HandleArgument::Tabpage(12)]);

        let call = resolve(&Method::POST, "/buf/1/attach").unwrap();
        assert_eq!(call.name, "nvim_buf_attach");
    }

    #[test]
    fn test_slashes_removed_from_verb() {
        assert_eq!(name(Method::GET, "/buf/2/lines/"), "nvim_buf_get_lines");
        assert_eq!(name(Method::POST, "/list/bufs"), "nvim_listbufs");
    }

    #[test]
    fn test_namespace_matches_whole_segment() {
        let call = resolve(&Method::POST, "/window").unwrap();
        assert_eq!(call.name, "nvim_window");
        assert!(call.handles.is_empty());
    }

    #[test]
    fn test_malformed_ids() {
        for path in ["/win", "/win/", "/buf/abc/name", "/tabpage/-1/win", "/buf/99999999999999999999/name"] {
            let err = resolve(&Method::GET, path).unwrap_err();
            assert!(matches!(err, GatewayError::MalformedPath { .. }), "{}", path);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = resolve(&Method::GET, "/buf/5/lines").unwrap();
        let b = resolve(&Method::GET, "/buf/5/lines").unwrap();
        assert_eq!(a, b);
    }
}
