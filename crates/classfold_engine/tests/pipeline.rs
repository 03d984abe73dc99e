//! Integration tests for whole rewrite runs over on-disk source trees.
//!
//! Each test lays out a small project in a temporary directory, runs the
//! engine over it the way the CLI does (discover, process, finish, flush,
//! save), and inspects the rewritten files and the cache file.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use classfold_cache::ChangeCache;
use classfold_common::short_hash;
use classfold_config::ScanConfig;
use classfold_engine::{
    discover_files, run_files, Action, Engine, EngineError, NameResolver, NamingError,
    NamingStrategy, RunOptions, RunReport, UtilityTable,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Project {
    _dir: TempDir,
    src: PathBuf,
    cache: PathBuf,
}

impl Project {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        for (name, content) in files {
            let path = src.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let cache = dir.path().join("classfold.lock");
        Self {
            _dir: dir,
            src,
            cache,
        }
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.src.join(name)).unwrap()
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.src.join(name), content).unwrap();
    }

    fn engine(&self, resolver: NameResolver, options: RunOptions) -> Engine {
        Engine::new(
            &self.src,
            ChangeCache::load(&self.cache),
            Box::new(utilities()),
            resolver,
            options,
        )
        .with_seed(7)
    }

    fn run_with(
        &self,
        resolver: NameResolver,
        options: RunOptions,
    ) -> Result<RunReport, EngineError> {
        let files = discover_files(&self.src, &ScanConfig::default()).unwrap();
        run_files(self.engine(resolver, options), files)
    }

    fn run(&self) -> RunReport {
        self.run_with(hashed_resolver(), RunOptions::default()).unwrap()
    }
}

fn utilities() -> UtilityTable {
    [
        ("bg-red-500", "background-color: #ef4444;"),
        ("text-sm", "font-size: 0.875rem;"),
        ("p-4", "padding: 1rem;"),
        ("flex", "display: flex;"),
        ("mt-2", "margin-top: 0.5rem;"),
        ("text-blue-500", "color: #3b82f6;"),
    ]
    .into_iter()
    .collect()
}

fn hashed_resolver() -> NameResolver {
    NameResolver::new("twk-", 999, None).with_seed(42)
}

/// Returns every value of `attr="..."` in `content`.
fn attr_values<'a>(content: &'a str, attr: &str) -> Vec<&'a str> {
    let needle = format!("{attr}=\"");
    content
        .split(needle.as_str())
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .collect()
}

/// Naming strategy that answers `<result>{base}-{n}</result>` and counts calls.
struct Numbered {
    base: &'static str,
    calls: Arc<AtomicUsize>,
}

impl NamingStrategy for Numbered {
    fn suggest(&mut self, _tag: Option<&str>, _class_string: &str) -> Result<String, NamingError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("<result>{}-{n}</result>", self.base))
    }
}

/// Naming strategy that always suggests the same name.
struct Constant(&'static str);

impl NamingStrategy for Constant {
    fn suggest(&mut self, _tag: Option<&str>, _class_string: &str) -> Result<String, NamingError> {
        Ok(self.0.to_string())
    }
}

// ---------------------------------------------------------------------------
// End-to-end rewriting
// ---------------------------------------------------------------------------

#[test]
fn inline_file_gets_hashed_name_and_style_block() {
    let project = Project::new(&[(
        "index.html",
        "<html><head><title>t</title></head><body><div class=\"bg-red-500 text-sm\">hi</div></body></html>",
    )]);

    let report = project.run();
    assert_eq!(report.rewritten(), 1);

    let content = project.read("index.html");
    let classes = attr_values(&content, "class");
    assert_eq!(classes.len(), 1);
    let name = classes[0];
    assert!(name.starts_with(&format!("twk-{}", short_hash("bg-red-500 text-sm"))));

    let style_start = content.find("<style>").unwrap();
    let head_end = content.find("</head>").unwrap();
    assert!(style_start < head_end);
    let style = &content[style_start..head_end];
    assert!(style.starts_with(&format!("<style>.{name} {{")));
    assert!(style.contains("/* generated from: bg-red-500 text-sm */"));
    assert!(style.contains("background-color: #ef4444;"));
    assert!(style.contains("font-size: 0.875rem;"));
    assert!(style.ends_with("}</style>"));
}

#[test]
fn second_run_over_unchanged_tree_is_a_noop() {
    let project = Project::new(&[
        ("index.html", "<head></head><p class=\"p-4 flex\">a</p>"),
        ("about.vue", "<template><span class=\"mt-2\">b</span></template>"),
        ("plain.html", "<p>no classes</p>"),
    ]);

    let first = project.run();
    assert_eq!(first.rewritten(), 2);
    assert_eq!(first.no_classes(), 1);
    let index = project.read("index.html");
    let about = project.read("about.vue");
    let cache_before = fs::read_to_string(&project.cache).unwrap();

    let second = project.run();
    assert_eq!(second.rewritten(), 0);
    assert_eq!(second.unchanged(), 3);
    assert_eq!(project.read("index.html"), index);
    assert_eq!(project.read("about.vue"), about);
    assert_eq!(fs::read_to_string(&project.cache).unwrap(), cache_before);
}

#[test]
fn edited_file_is_processed_again() {
    let project = Project::new(&[("index.html", "<head></head><p class=\"p-4\">a</p>")]);
    project.run();

    let edited = format!("{}<b class=\"text-sm\">new</b>", project.read("index.html"));
    project.write("index.html", &edited);

    let report = project.run();
    assert_eq!(
        report.action_for("index.html"),
        Some(&Action::Rewritten {
            occurrences: 2,
            companion: None
        })
    );
    let content = project.read("index.html");
    assert!(attr_values(&content, "class").contains(&"twk-text-sm"));
}

#[test]
fn cache_file_records_both_hashes_by_relative_path() {
    let project = Project::new(&[("pages/home.html", "<div class=\"p-4 flex\"></div>")]);
    project.run();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&project.cache).unwrap()).unwrap();
    let entry = &json["pages/home.html"];
    assert!(entry["hash"].is_string());
    assert!(entry["hashModified"].is_string());
    assert_ne!(entry["hash"], entry["hashModified"]);
    assert!(entry["modified"].as_u64().unwrap() > 0);
    assert!(entry["algorithm"].is_string());
}

#[test]
fn trailing_block_when_no_style_or_head() {
    let project = Project::new(&[("frag.vue", "<template><p class=\"mt-2\">x</p></template>")]);
    project.run();

    assert_eq!(
        project.read("frag.vue"),
        "<template><p class=\"twk-mt-2\">x</p></template>\n\
         <style>.twk-mt-2 {\n  /* generated from: mt-2 */\n  margin-top: 0.5rem;\n}</style>"
    );
}

#[test]
fn existing_style_tag_receives_css() {
    let project = Project::new(&[(
        "page.astro",
        "<div class=\"p-4\">x</div>\n<style>body { margin: 0; }</style>",
    )]);
    project.run();

    let content = project.read("page.astro");
    assert!(content.contains("<style>.twk-p-4 {"));
    assert!(content.ends_with("}body { margin: 0; }</style>"));
    assert_eq!(content.matches("<style>").count(), 1);
}

#[test]
fn plain_tokens_survive_and_unknown_classes_are_left_alone() {
    let project = Project::new(&[(
        "index.html",
        "<head></head><div class=\"card p-4 flex\">a</div><div class=\"hero  banner\">b</div>",
    )]);
    let report = project.run();

    let content = project.read("index.html");
    let classes = attr_values(&content, "class");
    assert!(classes[0].starts_with("card twk-"));
    assert_eq!(classes[1], "hero banner");
    assert!(!content.contains("generated from: hero"));
    assert_eq!(report.names_assigned, 1);
}

#[test]
fn component_file_gets_companion_stylesheet() {
    let project = Project::new(&[(
        "components/Button.tsx",
        "export const Button = () => <button className=\"flex p-4\">Go</button>;\n",
    )]);

    let report = project.run();
    assert_eq!(
        report.action_for("components/Button.tsx"),
        Some(&Action::Rewritten {
            occurrences: 1,
            companion: Some("components/Button.module.css".to_string()),
        })
    );

    let tsx = project.read("components/Button.tsx");
    let (import, body) = tsx.split_once('\n').unwrap();
    assert!(import.starts_with("import styles_generated_"));
    assert!(import.ends_with(" from \"./Button.module.css\";"));
    let name = attr_values(body, "className")[0];
    assert!(name.starts_with(&format!("twk-{}", short_hash("flex p-4"))));

    let sheet = project.read("components/Button.module.css");
    assert!(sheet.starts_with(&format!(".{name} {{")));
    assert!(sheet.contains("display: flex;"));
    assert!(sheet.contains("padding: 1rem;"));
    assert!(!tsx.contains("<style>"));

    // The stylesheet is not a scanned type, so a rerun leaves everything alone.
    let again = project.run();
    assert_eq!(again.rewritten(), 0);
}

#[test]
fn edited_component_keeps_earlier_rules_and_single_import() {
    let project = Project::new(&[(
        "Button.tsx",
        "export const Button = () => <button className=\"flex p-4\">Go</button>;\n",
    )]);
    project.run();
    let first = attr_values(&project.read("Button.tsx"), "className")[0].to_string();

    let edited = project
        .read("Button.tsx")
        .replace("Go</button>", "Go<i className=\"mt-2 text-sm\" /></button>");
    project.write("Button.tsx", &edited);

    let report = project.run();
    assert_eq!(report.rewritten(), 1);

    let tsx = project.read("Button.tsx");
    let names = attr_values(&tsx, "className");
    assert_eq!(names[0], first);
    let second = names[1];
    assert!(second.starts_with(&format!("twk-{}", short_hash("mt-2 text-sm"))));
    assert_eq!(tsx.lines().filter(|l| l.starts_with("import ")).count(), 1);

    let sheet = project.read("Button.module.css");
    let old_rule = sheet.find(&format!(".{first} {{")).unwrap();
    let new_rule = sheet.find(&format!(".{second} {{")).unwrap();
    assert!(old_rule < new_rule);
    assert!(sheet.contains("padding: 1rem;"));
    assert!(sheet.contains("margin-top: 0.5rem;"));
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

#[test]
fn permutations_share_one_name_across_files() {
    let project = Project::new(&[
        ("a.html", "<head></head><p class=\"text-sm bg-red-500\">a</p>"),
        ("b.html", "<head></head><p class=\"bg-red-500   text-sm\">b</p>"),
    ]);
    let report = project.run();
    assert_eq!(report.names_assigned, 1);

    let a = project.read("a.html");
    let b = project.read("b.html");
    assert_eq!(attr_values(&a, "class"), attr_values(&b, "class"));
    assert!(b.contains("/* generated from: text-sm bg-red-500 */"));
}

#[test]
fn order_sensitive_mode_keeps_permutations_apart() {
    let project = Project::new(&[(
        "a.html",
        "<head></head><p class=\"p-4 flex\">a</p><p class=\"flex p-4\">b</p>",
    )]);
    let options = RunOptions {
        order_matters: true,
        ..RunOptions::default()
    };
    let report = project.run_with(hashed_resolver(), options).unwrap();
    assert_eq!(report.names_assigned, 2);
    let content = project.read("a.html");
    let classes = attr_values(&content, "class");
    assert_ne!(classes[0], classes[1]);
}

#[test]
fn budget_limits_strategy_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let strategy = Numbered {
        base: "styled",
        calls: Arc::clone(&calls),
    };
    let resolver = NameResolver::new("twk-", 2, Some(Box::new(strategy))).with_seed(1);
    let project = Project::new(&[(
        "index.html",
        "<head></head><a class=\"p-4 flex\">1</a><b class=\"mt-2 text-sm\">2</b><i class=\"bg-red-500 text-sm\">3</i>",
    )]);

    let report = project.run_with(resolver, RunOptions::default()).unwrap();
    assert_eq!(report.strategy_invocations, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let content = project.read("index.html");
    let classes = attr_values(&content, "class");
    assert_eq!(classes[0], "twk-styled-1");
    assert_eq!(classes[1], "twk-styled-2");
    assert!(classes[2].starts_with(&format!("twk-{}", short_hash("bg-red-500 text-sm"))));
}

#[test]
fn colliding_suggestions_still_yield_unique_names() {
    let resolver =
        NameResolver::new("twk-", 999, Some(Box::new(Constant("<result>box</result>"))));
    let project = Project::new(&[
        ("a.html", "<head></head><a class=\"p-4 flex\">1</a><b class=\"mt-2 text-sm\">2</b>"),
        ("b.html", "<head></head><i class=\"bg-red-500 text-sm\">3</i><u class=\"flex p-4\">4</u>"),
    ]);

    let report = project.run_with(resolver, RunOptions::default()).unwrap();
    assert_eq!(report.names_assigned, 3);

    let mut names = HashSet::new();
    for file in ["a.html", "b.html"] {
        let content = project.read(file);
        for class in attr_values(&content, "class") {
            names.insert(class.to_string());
        }
    }
    assert_eq!(names.len(), 3);
    assert!(names.contains("twk-box"));
    assert!(names.contains(&format!("twk-box-{}", short_hash("mt-2 text-sm"))));
}

// ---------------------------------------------------------------------------
// Dry runs, failures and bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn dry_run_writes_nothing() {
    let original = "<head></head><div class=\"p-4 flex\">x</div>";
    let project = Project::new(&[("index.html", original)]);
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let report = project.run_with(hashed_resolver(), options).unwrap();
    assert!(report.dry_run);
    assert_eq!(report.rewritten(), 1);
    assert_eq!(project.read("index.html"), original);
    assert!(!project.cache.exists());
}

#[test]
fn failed_run_leaves_files_and_cache_untouched() {
    let original = "<head></head><div class=\"p-4 flex\">x</div>";
    let project = Project::new(&[("index.html", original)]);
    let files = vec![project.src.join("index.html"), project.src.join("vanished.html")];

    let result = run_files(
        project.engine(hashed_resolver(), RunOptions::default()),
        files,
    );
    assert!(matches!(result, Err(EngineError::Io { .. })));
    assert_eq!(project.read("index.html"), original);
    assert!(!project.cache.exists());
}

#[test]
fn unsupported_types_are_reported_not_touched() {
    let project = Project::new(&[("notes.md", "<p class=\"p-4\">x</p>")]);
    let scan = ScanConfig {
        file_types: vec![".md".into()],
        ..ScanConfig::default()
    };
    let files = discover_files(&project.src, &scan).unwrap();
    let report = run_files(
        project.engine(hashed_resolver(), RunOptions::default()),
        files,
    )
    .unwrap();

    assert_eq!(report.action_for("notes.md"), Some(&Action::Unsupported));
    assert_eq!(project.read("notes.md"), "<p class=\"p-4\">x</p>");
}

#[test]
fn repeated_paths_are_processed_once() {
    let project = Project::new(&[("index.html", "<head></head><p class=\"p-4 flex\">a</p>")]);
    let path = project.src.join("index.html");
    let report = run_files(
        project.engine(hashed_resolver(), RunOptions::default()),
        [path.clone(), path],
    )
    .unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(project.read("index.html").matches("<style>").count(), 1);
}

#[test]
fn removed_files_are_dropped_from_the_cache() {
    let project = Project::new(&[
        ("keep.html", "<p class=\"p-4\">a</p>"),
        ("drop.html", "<p class=\"flex\">b</p>"),
    ]);
    project.run();
    fs::remove_file(project.src.join("drop.html")).unwrap();
    project.run();

    let cache = ChangeCache::load(&project.cache);
    assert!(cache.entry("keep.html").is_some());
    assert!(cache.entry("drop.html").is_none());
}

#[test]
fn discover_skips_excluded_directories() {
    let project = Project::new(&[
        ("index.html", "<p class=\"p-4\">a</p>"),
        ("node_modules/lib/index.html", "<p class=\"flex\">b</p>"),
    ]);
    let files = discover_files(&project.src, &ScanConfig::default()).unwrap();
    assert_eq!(files, vec![project.src.join("index.html")]);

    project.run();
    assert_eq!(
        project.read("node_modules/lib/index.html"),
        "<p class=\"flex\">b</p>"
    );
}
