pub(crate) mod contents {
    const INDEX_HTML: &str = include_str!("index.html");
    const MAIN_JS: &str = include_str!("main.js");
    const STYLES_CSS: &str = include_str!("styles.css");

    const TOKEN_PLACEHOLDER: &str = "__SESSION_TOKEN__";

    /// The bridge page, with assets inlined and the session token filled in.
    pub(crate) fn index_html(session_token: &str) -> String {
        INDEX_HTML
            .replace("/*__STYLES__*/", STYLES_CSS)
            .replace("/*__MAIN_JS__*/", &MAIN_JS.replace(TOKEN_PLACEHOLDER, session_token))
    }

}
