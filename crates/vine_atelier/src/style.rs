//! Style compiler seam and virtual style imports.

use memchr::memmem;
use vine_carton::{CompactString, FxHashMap, FxHashSet, SmallVec};
use vine_croquis::StyleLang;

use crate::context::FileContext;
use crate::error::StyleCompileError;

/// Everything a style compiler needs for one `vineStyle` block.
#[derive(Debug, Clone, Copy)]
pub struct StyleCompileRequest<'r> {
    pub file_id: &'r str,
    pub scope_id: &'r str,
    pub component_name: &'r str,
    pub lang: StyleLang,
    pub source: &'r str,
    pub scoped: bool,
    /// `v-bind()` expression -> CSS variable hash.
    pub css_bindings: &'r FxHashMap<CompactString, String>,
}

/// Compiles (and preprocesses) component styles.
pub trait StyleCompiler {
    fn compile(&self, request: StyleCompileRequest<'_>) -> Result<String, StyleCompileError>;
}

/// Compile the style registered under `scope_id`.
pub fn compile_vine_style(
    file_ctx: &FileContext,
    scope_id: &str,
    compiler: &dyn StyleCompiler,
) -> Result<String, StyleCompileError> {
    let style = file_ctx
        .style_define
        .get(scope_id)
        .ok_or_else(|| StyleCompileError::UnknownScope(scope_id.to_string()))?;
    let empty = FxHashMap::default();
    let css_bindings = file_ctx
        .style_owner(scope_id)
        .map_or(&empty, |comp| &comp.css_bindings);

    tracing::debug!(file = %file_ctx.file_id, scope_id, lang = %style.lang, "compiling vine style");
    compiler.compile(StyleCompileRequest {
        file_id: &file_ctx.file_id,
        scope_id,
        component_name: &style.component_name,
        lang: style.lang,
        source: &style.source,
        scoped: style.scoped,
        css_bindings,
    })
}

/// Virtual style imports of a file, one per styled component.
///
/// A component comes before every component its template renders, so
/// styles of used components are imported later and win on equal
/// specificity.
pub fn style_import_requests(file_ctx: &FileContext) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut requests = Vec::new();

    for index in components_by_usage(file_ctx) {
        let comp = &file_ctx.components[index];
        let Some(style) = file_ctx.style_define.get(&comp.scope_id) else {
            continue;
        };
        if style.component_name != comp.fn_name || !seen.insert(comp.scope_id.as_str()) {
            continue;
        }
        let lang = style.lang.as_str();
        let scoped = if style.scoped { "&scoped=true" } else { "" };
        requests.push(format!(
            "import '{}?type=vine-style&scopeId={}&comp={}&lang={lang}{scoped}&virtual.{lang}';",
            file_ctx.file_id, comp.scope_id, comp.fn_name
        ));
    }

    requests
}

/// Component indices, users before the components they use, otherwise in
/// source order. Cycles are broken at the earliest remaining component.
fn components_by_usage(file_ctx: &FileContext) -> Vec<usize> {
    let comps = &file_ctx.components;
    let count = comps.len();
    let mut uses: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); count];
    let mut pending_users = vec![0usize; count];

    for (user, comp) in comps.iter().enumerate() {
        let Some(template) = &comp.template_source else {
            continue;
        };
        for (used, other) in comps.iter().enumerate() {
            if used != user
                && !uses[user].contains(&used)
                && template_renders(template, &other.fn_name)
            {
                uses[user].push(used);
                pending_users[used] += 1;
            }
        }
    }

    let mut order = Vec::with_capacity(count);
    let mut done = vec![false; count];
    while order.len() < count {
        let next = (0..count)
            .find(|&i| !done[i] && pending_users[i] == 0)
            .or_else(|| (0..count).find(|&i| !done[i]));
        let Some(next) = next else {
            break;
        };
        done[next] = true;
        order.push(next);
        for &used in &uses[next] {
            pending_users[used] = pending_users[used].saturating_sub(1);
        }
    }
    order
}

/// Whether `template` contains a `<Name` tag.
fn template_renders(template: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let needle = format!("<{name}");
    memmem::find_iter(template.as_bytes(), needle.as_bytes()).any(|pos| {
        let after = template.as_bytes().get(pos + needle.len()).copied();
        !after.is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'$'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ComponentContext, StyleDefinition};
    use vine_carton::SourceRange;

    fn component(name: &str, scope_id: &str, template: &str) -> ComponentContext {
        ComponentContext {
            fn_name: name.into(),
            scope_id: scope_id.to_string(),
            template_source: Some(template.to_string()),
            ..Default::default()
        }
    }

    fn style(name: &str, lang: StyleLang, scoped: bool) -> StyleDefinition {
        StyleDefinition {
            lang,
            source: ".a { color: v-bind(color) }".to_string(),
            range: SourceRange::default(),
            scoped,
            component_name: name.into(),
        }
    }

    struct EchoCompiler;

    impl StyleCompiler for EchoCompiler {
        fn compile(&self, request: StyleCompileRequest<'_>) -> Result<String, StyleCompileError> {
            if request.lang == StyleLang::Less {
                return Err(StyleCompileError::Compile {
                    lang: request.lang.to_string(),
                    message: "unsupported".to_string(),
                });
            }
            let vars = request.css_bindings.get("color").cloned().unwrap_or_default();
            Ok(format!("{}|{}|{}", request.component_name, request.scope_id, vars))
        }
    }

    #[test]
    fn test_users_come_first() {
        let mut file_ctx = FileContext::new("f", "");
        file_ctx.components = vec![
            component("Card", "c1", "<div/>"),
            component("Page", "p1", "<Layout><Card /></Layout>"),
            component("Layout", "l1", "<main><slot/></main>"),
        ];
        for (name, id) in [("Card", "c1"), ("Page", "p1"), ("Layout", "l1")] {
            file_ctx
                .style_define
                .insert(id.to_string(), style(name, StyleLang::Css, false));
        }

        let requests = style_import_requests(&file_ctx);
        let comps: Vec<_> = requests
            .iter()
            .map(|r| r.split("&comp=").nth(1).unwrap().split('&').next().unwrap())
            .collect();
        assert_eq!(comps, ["Page", "Card", "Layout"]);
    }

    #[test]
    fn test_tag_prefix_is_not_a_use() {
        assert!(template_renders("<MyBox/>", "MyBox"));
        assert!(template_renders("<div><MyBox title=\"x\"></MyBox></div>", "MyBox"));
        assert!(!template_renders("<MyBoxes/>", "MyBox"));
        assert!(!template_renders("MyBox", "MyBox"));
    }

    #[test]
    fn test_cycle_keeps_every_component() {
        let mut file_ctx = FileContext::new("f", "");
        file_ctx.components = vec![
            component("A", "a", "<B/>"),
            component("B", "b", "<A/>"),
        ];
        assert_eq!(components_by_usage(&file_ctx), [0, 1]);
    }

    #[test]
    fn test_compile_vine_style() {
        let mut file_ctx = FileContext::new("f", "");
        let mut comp = component("MyComp", "s1", "<div/>");
        comp.css_bindings.insert("color".into(), "7aa07bf2".to_string());
        file_ctx.components.push(comp);
        file_ctx
            .style_define
            .insert("s1".to_string(), style("MyComp", StyleLang::Scss, true));
        file_ctx
            .style_define
            .insert("s2".to_string(), style("Other", StyleLang::Less, false));

        assert_eq!(
            compile_vine_style(&file_ctx, "s1", &EchoCompiler).unwrap(),
            "MyComp|s1|7aa07bf2"
        );
        assert_eq!(
            compile_vine_style(&file_ctx, "missing", &EchoCompiler),
            Err(StyleCompileError::UnknownScope("missing".to_string()))
        );
        let err = compile_vine_style(&file_ctx, "s2", &EchoCompiler).unwrap_err();
        assert_eq!(err.to_string(), "Failed to compile less style: unsupported");
    }
}
