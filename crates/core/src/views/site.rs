use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static SYS_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sys\.path\s*=\s*\[([\s\S]*?)\]").expect("valid sys.path regex"));
static USER_BASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"USER_BASE:\s*'(.*?)'").expect("valid USER_BASE regex"));
static USER_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"USER_SITE:\s*'(.*?)'").expect("valid USER_SITE regex"));
static ENABLE_USER_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ENABLE_USER_SITE:\s*(True|False)").expect("valid ENABLE_USER_SITE regex"));

/// What `python -m site` reports about an interpreter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteOutput {
    pub sys_path: Vec<String>,
    pub user_base: String,
    pub user_site: String,
    pub enable_user_site: bool,
}

impl SiteOutput {
    /// The first `sys.path` entry that is a `site-packages` directory
    pub fn site_packages(&self) -> Option<&str> {
        self.sys_path
            .iter()
            .map(String::as_str)
            .find(|path| path.ends_with("site-packages"))
    }
}

/// Missing sections parse as empty
pub fn parse_site_output(output: &str) -> SiteOutput {
    let capture = |re: &Regex| {
        re.captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    let sys_path = capture(&SYS_PATH)
        .map(|list| {
            list.lines()
                .map(|line| line.trim().trim_end_matches(',').replace('\'', ""))
                .filter(|line| !line.is_empty())
                .collect()
        })
        .unwrap_or_default();

    SiteOutput {
        sys_path,
        user_base: capture(&USER_BASE).unwrap_or_default(),
        user_site: capture(&USER_SITE).unwrap_or_default(),
        enable_user_site: capture(&ENABLE_USER_SITE).as_deref() == Some("True"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "sys.path = [
    '/home/me/demo',
    '/home/me/demo/.pixi/envs/default/lib/python312.zip',
    '/home/me/demo/.pixi/envs/default/lib/python3.12',
    '/home/me/demo/.pixi/envs/default/lib/python3.12/lib-dynload',
    '/home/me/demo/.pixi/envs/default/lib/python3.12/site-packages',
]
USER_BASE: '/home/me/.local' (exists)
USER_SITE: '/home/me/.local/lib/python3.12/site-packages' (doesn't exist)
ENABLE_USER_SITE: True
";

    #[test]
    fn test_parse_site_output() {
        let site = parse_site_output(OUTPUT);
        assert_eq!(site.sys_path.len(), 5);
        assert_eq!(site.sys_path[0], "/home/me/demo");
        assert_eq!(
            site.site_packages(),
            Some("/home/me/demo/.pixi/envs/default/lib/python3.12/site-packages")
        );
        assert_eq!(site.user_base, "/home/me/.local");
        assert_eq!(site.user_site, "/home/me/.local/lib/python3.12/site-packages");
        assert!(site.enable_user_site);
    }

    #[test]
    fn test_garbage_parses_empty() {
        let site = parse_site_output("Traceback (most recent call last):");
        assert_eq!(site, SiteOutput::default());
        assert_eq!(site.site_packages(), None);
    }

    #[test]
    fn test_disabled_user_site() {
        let site = parse_site_output("ENABLE_USER_SITE: False\n");
        assert!(!site.enable_user_site);
    }
}
