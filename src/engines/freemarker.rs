//! FreeMarker (java)
//!
//! `${…}` interpolations like Mako; identity uses the `?upper_case`
//! built-in, which nothing python-shaped accepts. Exec instantiates the
//! bundled `Execute` utility; there is no comparable in-template file
//! primitive, so read/write stay no-ops.

use crate::core::closures::{ClosureSet, ClosureTable, InjectionContext};
use crate::core::descriptor::{EngineDescriptor, EvalProbe, ExecProbe, Identity};
use crate::core::template::Template;

pub fn descriptor() -> EngineDescriptor {
    let mut closures = ClosureTable::new();
    closures.insert("quote", vec!["'", "\""]);
    closures.insert("paren", vec![")"]);

    EngineDescriptor {
        name: "freemarker",
        language: "java",
        render_tag: Template::new("${{payload}}"),
        header_tag: Template::new("${{header}}"),
        trailer_tag: Template::new("${{trailer}}"),
        contexts: vec![
            InjectionContext {
                level: 1,
                prefix: Some(Template::new("{closure}}")),
                suffix: Some("${1"),
                closures: vec![ClosureSet {
                    level: 1,
                    specs: vec![vec![], vec!["quote"], vec!["quote", "paren"]],
                }],
            },
            // Trapped inside a <#directive >.
            InjectionContext {
                level: 3,
                prefix: Some(Template::new("{closure}>")),
                suffix: Some("<#assign _ = 1"),
                closures: vec![ClosureSet {
                    level: 3,
                    specs: vec![vec![], vec!["quote"], vec!["quote", "paren"]],
                }],
            },
        ],
        closures,
        identity: Identity::Uppercase(Template::new("${'{token}'?upper_case}")),
        eval: Some(EvalProbe {
            literal: Template::new("${'{token}'}"),
            language: "freemarker",
        }),
        exec: Some(ExecProbe {
            command: Template::new(
                "<#assign ex='freemarker.template.utility.Execute'?new()>${ex('{command}')}",
            ),
        }),
        read: None,
        write: None,
    }
}
