use cargo_metadata::{DependencyKind, MetadataCommand, Package};
use std::collections::{BTreeMap, BTreeSet};

const SELF_NAME: &str = "boundary-check";

struct Allowed {
    normal: BTreeSet<&'static str>,
    dev: BTreeSet<&'static str>,
}

fn main() {
    let metadata = match MetadataCommand::new().exec() {
        Ok(metadata) => metadata,
        Err(err) => {
            eprintln!("boundary-check: failed to read cargo metadata: {err}");
            std::process::exit(2);
        }
    };

    let workspace: BTreeSet<_> = metadata.workspace_members.iter().cloned().collect();
    let packages: BTreeMap<String, Package> = metadata
        .packages
        .into_iter()
        .filter(|pkg| workspace.contains(&pkg.id))
        .map(|pkg| (pkg.name.clone(), pkg))
        .collect();

    let allowlist = allowlist();
    let mut violations = Vec::new();

    for (name, pkg) in &packages {
        if name == SELF_NAME {
            continue;
        }
        let Some(allowed) = allowlist.get(name.as_str()) else {
            violations.push(format!("{name} is not listed in the dependency allowlist"));
            continue;
        };

        for (dep, kind) in workspace_deps(pkg, &packages) {
            let ok = match kind {
                DependencyKind::Development => {
                    allowed.normal.contains(dep.as_str()) || allowed.dev.contains(dep.as_str())
                }
                _ => allowed.normal.contains(dep.as_str()),
            };
            if !ok {
                violations.push(format!("{name} -> {dep} ({kind:?})"));
            }
        }
    }

    if violations.is_empty() {
        println!("boundary-check: ok");
    } else {
        eprintln!("boundary-check: forbidden workspace dependencies detected:");
        for item in violations {
            eprintln!("  {item}");
        }
        std::process::exit(1);
    }
}

fn workspace_deps(
    pkg: &Package,
    workspace: &BTreeMap<String, Package>,
) -> Vec<(String, DependencyKind)> {
    pkg.dependencies
        .iter()
        .filter(|dep| dep.name != pkg.name && workspace.contains_key(&dep.name))
        .map(|dep| (dep.name.clone(), dep.kind))
        .collect()
}

// The engine never sees presentation or CLI crates.
fn allowlist() -> BTreeMap<&'static str, Allowed> {
    let mut map = BTreeMap::new();
    map.insert("tempora-core", allowed([], []));
    map.insert("tempora-scores", allowed(["tempora-core"], []));
    map.insert("tempora-eval", allowed(["tempora-core", "tempora-scores"], []));
    map.insert(
        "tempora-report",
        allowed(["tempora-core", "tempora-eval"], ["tempora-scores"]),
    );
    map.insert(
        "tempora-cli",
        allowed(
            [
                "tempora-core",
                "tempora-scores",
                "tempora-eval",
                "tempora-report",
            ],
            [],
        ),
    );
    map
}

fn allowed<const N: usize, const M: usize>(
    normal: [&'static str; N],
    dev: [&'static str; M],
) -> Allowed {
    Allowed {
        normal: normal.into_iter().collect(),
        dev: dev.into_iter().collect(),
    }
}
