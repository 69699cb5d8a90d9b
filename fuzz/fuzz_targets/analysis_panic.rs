#![no_main]
use ferrotex_analysis::{
    analyze_missing_imports, default_index_programs, AliasRegistry, CollectingHost, FileSet,
    ReferenceResolver,
};
use ferrotex_package::{BUILTIN_GRAPH, BUILTIN_REGISTRY};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Lossy conversion keeps inputs that are "almost" text.
    let text = String::from_utf8_lossy(data);
    let set = FileSet::single("fuzz.tex", text.to_string());

    let aliases = AliasRegistry::new();
    let resolver = ReferenceResolver::new(&BUILTIN_REGISTRY, &aliases, &set);
    for (_, usage) in set.commands() {
        let _ = resolver.resolve(usage);
    }

    if let Ok(reports) = analyze_missing_imports(&set, &BUILTIN_REGISTRY, &BUILTIN_GRAPH, true) {
        let mut host = CollectingHost::default();
        for fix in reports.iter().flat_map(|report| &report.fixes) {
            let _ = fix.apply(&set, &BUILTIN_GRAPH, &mut host);
        }
        for edit in &host.edits {
            let _ = edit.apply(&text);
        }
    }

    let _ = default_index_programs(&set, false);
});
