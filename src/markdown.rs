use once_cell::sync::Lazy;
use regex::Regex;

/// Caller-supplied attributes for the generated tags. The two consumers of
/// the renderer (analysis view and print report) share one pipeline and only
/// differ in these.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub h1_attrs: &'static str,
    pub h2_attrs: &'static str,
    pub h3_attrs: &'static str,
    pub li_attrs: &'static str,
}

impl RenderStyle {
    /// CSS-class attributes for the in-app analysis view.
    pub fn modal() -> Self {
        Self {
            h1_attrs: r#"class="text-3xl font-extrabold mb-4 mt-6""#,
            h2_attrs: r#"class="text-2xl font-bold mb-3 mt-5""#,
            h3_attrs: r#"class="text-xl font-semibold mb-2 mt-4""#,
            li_attrs: r#"class="ml-6 mb-1""#,
        }
    }

    /// Inline-style attributes for the standalone print document.
    pub fn print() -> Self {
        Self {
            h1_attrs: r#"style="font-size: 1.875rem; font-weight: 800; margin-bottom: 1rem; margin-top: 1.5rem;""#,
            h2_attrs: r#"style="font-size: 1.5rem; font-weight: 700; margin-bottom: 0.75rem; margin-top: 1.25rem; border-bottom: 2px solid #D1D5DB; padding-bottom: 0.5rem;""#,
            h3_attrs: r#"style="font-size: 1.25rem; font-weight: 600; margin-bottom: 0.5rem; margin-top: 1rem;""#,
            li_attrs: r#"style="margin-left: 1.5rem; margin-bottom: 0.25rem;""#,
        }
    }
}

// The regex crate has no backreferences, so the two delimiter forms of bold
// and italic are separate patterns applied in sequence.
static BOLD_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.*?)__").unwrap());
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.*?)_").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`{1,3}(.*?)`{1,3}").unwrap());
static HEADING_3: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static HEADING_2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static HEADING_1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\* (.*)$").unwrap());
static LIST_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(<li.*>[\s\S]*?</li>)").unwrap());
static ADJACENT_LISTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"</ul>\s*<ul>").unwrap());

/// Best-effort conversion of a constrained markdown subset (bold, italic,
/// inline code, `#`/`##`/`###` headings, `* ` bullets, newlines) to an HTML
/// fragment.
///
/// This is a sequence of textual substitutions, not a parse; each step runs
/// on the output of the previous one and the order is significant. Emphasis
/// markers inside headings or list items can produce malformed nesting, and
/// intra-word underscores are read as emphasis delimiters. Both artifacts are
/// long-standing display behavior and are pinned by tests below.
pub fn render(input: &str, style: &RenderStyle) -> String {
    let html = BOLD_STARS.replace_all(input, "<strong>${1}</strong>");
    let html = BOLD_UNDERSCORES.replace_all(&html, "<strong>${1}</strong>");
    let html = ITALIC_STAR.replace_all(&html, "<em>${1}</em>");
    let html = ITALIC_UNDERSCORE.replace_all(&html, "<em>${1}</em>");
    let html = INLINE_CODE.replace_all(&html, "<code>${1}</code>");

    // Most specific heading first so `###` lines do not resolve as `#`.
    let html = HEADING_3.replace_all(&html, format!("<h3 {}>${{1}}</h3>", style.h3_attrs));
    let html = HEADING_2.replace_all(&html, format!("<h2 {}>${{1}}</h2>", style.h2_attrs));
    let html = HEADING_1.replace_all(&html, format!("<h1 {}>${{1}}</h1>", style.h1_attrs));

    let html = LIST_ITEM.replace_all(&html, format!("<li {}>${{1}}</li>", style.li_attrs));
    let html = LIST_RUN.replace_all(&html, "<ul>${1}</ul>");
    let html = ADJACENT_LISTS.replace_all(&html, "");

    html.replace('\n', "<br />")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modal(input: &str) -> String {
        render(input, &RenderStyle::modal())
    }

    #[test]
    fn inline_spans_nest_without_leftover_delimiters() {
        assert_eq!(
            modal("**a** *b* `c`"),
            "<strong>a</strong> <em>b</em> <code>c</code>"
        );
    }

    #[test]
    fn underscore_delimiters_work_like_stars() {
        assert_eq!(modal("__a__ _b_"), "<strong>a</strong> <em>b</em>");
    }

    #[test]
    fn triple_backticks_become_code() {
        assert_eq!(modal("```let x = 1;```"), "<code>let x = 1;</code>");
    }

    #[test]
    fn headings_resolve_most_specific_first() {
        let html = modal("# Title\n## Sub\n### Detail");
        assert!(html.contains(">Title</h1>"));
        assert!(html.contains(">Sub</h2>"));
        assert!(html.contains(">Detail</h3>"));
        let h1_pos = html.find("<h1").unwrap();
        let h2_pos = html.find("<h2").unwrap();
        assert!(h1_pos < h2_pos);
    }

    #[test]
    fn consecutive_bullets_share_one_list_container() {
        let html = modal("* x\n* y\n");
        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("</ul>").count(), 1);
        assert_eq!(html.matches("<li").count(), 2);
        assert!(html.contains(">x</li>"));
        assert!(html.contains(">y</li>"));
    }

    #[test]
    fn newlines_become_line_breaks() {
        assert_eq!(modal("one\ntwo"), "one<br />two");
    }

    #[test]
    fn intra_word_underscores_are_read_as_emphasis() {
        // Pinned artifact of the substitution approach.
        assert_eq!(modal("snake_case_name"), "snake<em>case</em>name");
    }

    #[test]
    fn style_presets_only_change_attributes() {
        let modal_html = render("# Title\n* item", &RenderStyle::modal());
        let print_html = render("# Title\n* item", &RenderStyle::print());
        assert!(modal_html.contains(r#"<h1 class="#));
        assert!(print_html.contains(r#"<h1 style="#));
        assert!(modal_html.contains(">Title</h1>"));
        assert!(print_html.contains(">Title</h1>"));
    }
}
