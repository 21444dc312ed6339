//! Engine descriptor registry
//!
//! Concrete per-engine reflection tags, escape contexts and capability
//! payloads. Registry order matters: descriptors sharing tag shapes (jinja2
//! and twig both render `{{…}}`) are disambiguated by their identity checks,
//! and the driver stops at the first engine that identifies.

mod freemarker;
mod jinja2;
mod mako;
mod twig;

use crate::core::descriptor::EngineDescriptor;

pub fn registry() -> Vec<EngineDescriptor> {
    vec![
        jinja2::descriptor(),
        twig::descriptor(),
        mako::descriptor(),
        freemarker::descriptor(),
    ]
}

/// The registry's engine names, for validating an `--engine` restriction.
pub fn known_names() -> Vec<&'static str> {
    registry().iter().map(|d| d.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = registry().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), registry().len());
    }

    #[test]
    fn known_names_match_the_registry() {
        let names = known_names();
        assert!(names.contains(&"jinja2"));
        assert!(!names.contains(&"jinja"));
        assert_eq!(names.len(), registry().len());
    }

    #[test]
    fn tags_carry_their_slots() {
        for d in registry() {
            assert!(d.render_tag.raw().contains("{payload}"), "{}", d.name);
            assert!(d.header_tag.raw().contains("{header}"), "{}", d.name);
            assert!(d.trailer_tag.raw().contains("{trailer}"), "{}", d.name);
        }
    }

    #[test]
    fn closure_specs_reference_known_components() {
        for d in registry() {
            for ctx in &d.contexts {
                for set in &ctx.closures {
                    for spec in &set.specs {
                        for name in spec {
                            assert!(
                                d.closures.contains_key(name),
                                "{}: unknown closure component {}",
                                d.name,
                                name
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn every_context_expands_to_candidates() {
        use crate::core::closures::expand_closures;
        for d in registry() {
            for ctx in &d.contexts {
                let closures = expand_closures(ctx, &d.closures, 5);
                assert!(!closures.is_empty(), "{}: context expands to nothing", d.name);
            }
        }
    }

    #[test]
    fn masked_tags_render_for_logging() {
        let d = jinja2::descriptor();
        assert_eq!(d.render_tag.masked("payload"), "{{*}}");
        let d = mako::descriptor();
        assert_eq!(d.render_tag.masked("payload"), "${*}");
    }
}
