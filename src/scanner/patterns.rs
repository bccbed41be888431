//! Static detection tables. Built once per process and never mutated.

use regex::Regex;
use std::sync::OnceLock;

pub const NODE: &str = "Node.js";
pub const REACT: &str = "React";
pub const NEXTJS: &str = "Next.js";
pub const EXPRESS: &str = "Express";
pub const TYPESCRIPT: &str = "TypeScript";
pub const PYTHON: &str = "Python";
pub const DJANGO: &str = "Django";
pub const FLASK: &str = "Flask";
pub const FASTAPI: &str = "FastAPI";
pub const RAILS: &str = "Ruby on Rails";
pub const JAVA: &str = "Java";
pub const SPRING_BOOT: &str = "Spring Boot";
pub const GO: &str = "Go";
pub const PHP: &str = "PHP";
pub const LARAVEL: &str = "Laravel";
pub const DOTNET: &str = ".NET";

/// Filename (label, regex) pairs, evaluated against a file's base name.
const TECH_PATTERNS: &[(&str, &str)] = &[
    (NODE, r"package\.json"),
    (REACT, r"react"),
    (NEXTJS, r"next"),
    (TYPESCRIPT, r"tsconfig\.json"),
    (PYTHON, r"requirements\.txt|\.py$"),
    (DJANGO, r"manage\.py"),
    (FLASK, r"flask"),
    (RAILS, r"Gemfile|\.rb$"),
    (JAVA, r"pom\.xml|\.java$"),
    (SPRING_BOOT, r"spring"),
    (GO, r"go\.mod|\.go$"),
    (PHP, r"composer\.json|\.php$"),
    (LARAVEL, r"artisan"),
    (DOTNET, r"\.csproj$"),
];

/// Keyword → default port. Matched as a case-sensitive substring of file content.
pub const PORT_KEYWORDS: &[(&str, u16)] = &[
    ("node", 3000),
    ("react", 3000),
    ("next", 3000),
    ("express", 3000),
    ("django", 8000),
    ("flask", 5000),
    ("rails", 3000),
    ("spring", 8080),
    ("laravel", 8000),
    ("php", 8000),
    ("apache", 80),
    ("nginx", 80),
];

/// Entry point patterns in priority order.
const ENTRY_PATTERNS: &[&str] = &[
    r"index\.(js|jsx|ts|tsx)$",
    r"main\.(js|jsx|ts|tsx|py|rb|java|go|php)$",
    r"app\.(js|jsx|ts|tsx|py|rb|java|go|php)$",
];

pub struct TechPattern {
    pub label: &'static str,
    pub regex: Regex,
}

pub fn tech_patterns() -> &'static [TechPattern] {
    static PATTERNS: OnceLock<Vec<TechPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TECH_PATTERNS
            .iter()
            .map(|&(label, re)| TechPattern {
                label,
                regex: Regex::new(re).expect("valid tech pattern"),
            })
            .collect()
    })
}

fn entry_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ENTRY_PATTERNS
            .iter()
            .map(|re| Regex::new(re).expect("valid entry pattern"))
            .collect()
    })
}

/// Labels whose filename pattern matches `base_name`, in table order.
pub fn labels_for(base_name: &str) -> impl Iterator<Item = &'static str> + '_ {
    tech_patterns()
        .iter()
        .filter(move |p| p.regex.is_match(base_name))
        .map(|p| p.label)
}

/// Ports whose keyword occurs anywhere in `content`.
pub fn ports_for(content: &str) -> impl Iterator<Item = u16> + '_ {
    PORT_KEYWORDS
        .iter()
        .filter(move |(kw, _)| content.contains(kw))
        .map(|(_, port)| *port)
}

pub fn is_entry_point(base_name: &str) -> bool {
    entry_patterns().iter().any(|re| re.is_match(base_name))
}
