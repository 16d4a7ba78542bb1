//! Performance benchmarks for analysis plus code generation.
//!
//! Programs are built directly as trees, so the numbers cover only the
//! compiler passes:
//! - Size-based: a growing number of loop-heavy methods
//! - Feature-specific: class hierarchies, conditions, namespaces
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect per-pass timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

#![allow(clippy::collapsible_if)]

use bumpalo::Bump;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use mjc::ast::{AstBuilder, BinaryOp, CondTerm, Decl, MethodDecl, Program, RelOp, Stmt};
use mjc::Compiler;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
use std::collections::HashMap;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

#[cfg(feature = "profile-with-puffin")]
fn collect_scopes_recursive(
    stream: &puffin::Stream,
    scope: &puffin::Scope,
    scope_collection: &puffin::ScopeCollection,
    scope_timings: &mut HashMap<String, i64>,
) {
    use puffin::Reader;

    if let Some(details) = scope_collection.fetch_by_id(&scope.id) {
        let name = details.name().to_string();
        *scope_timings.entry(name).or_insert(0) += scope.record.duration_ns;
    }

    if scope.child_begin_position < scope.child_end_position {
        if let Ok(reader) = Reader::with_offset(stream, scope.child_begin_position) {
            if let Ok(children) = reader.read_top_scopes() {
                for child in children {
                    collect_scopes_recursive(stream, &child, scope_collection, scope_timings);
                }
            }
        }
    }
}

/// Print accumulated profiling statistics for all scopes.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;

    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };

    let view = frame_view.lock();
    let scope_collection = view.scope_collection();

    let mut scope_timings: HashMap<String, i64> = HashMap::new();
    let mut frame_count = 0i64;

    for frame in view.recent_frames() {
        frame_count += 1;
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        for (_thread_info, stream_info) in unpacked.thread_streams.iter() {
            let reader = Reader::from_start(&stream_info.stream);
            if let Ok(scopes) = reader.read_top_scopes() {
                for scope in scopes {
                    collect_scopes_recursive(
                        &stream_info.stream,
                        &scope,
                        scope_collection,
                        &mut scope_timings,
                    );
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({} frames) ===", frame_count);

    if scope_timings.is_empty() {
        println!("  No scopes recorded.");
        println!("  Build with the `profiling` feature so the passes are instrumented");
    } else {
        let mut entries: Vec<_> = scope_timings.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1));

        let total_ns: i64 = entries.iter().map(|(_, ns)| **ns).sum();

        for (name, ns) in &entries {
            let ns = **ns;
            let avg_ns = if frame_count > 0 { ns / frame_count } else { ns };
            let pct = if total_ns > 0 {
                ns as f64 / total_ns as f64 * 100.0
            } else {
                0.0
            };
            println!(
                "  {:40} {:>10.2?} avg ({:>5.1}%)",
                name,
                std::time::Duration::from_nanos(avg_ns as u64),
                pct
            );
        }
    }
    println!("=====================================\n");
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

// ============================================================================
// Workloads
// ============================================================================

/// `int f<k>(int v) { int i, s; s = 0; for (...) { if (i == 3 || s > 100) continue; s = s + i * k; } return s; }`
fn looping_method<'ast>(b: &AstBuilder<'ast>, k: i32) -> MethodDecl<'ast> {
    let skip = b.cond(&[
        b.term(&[b.rel(b.name("i"), RelOp::Eq, b.int(3))]),
        b.term(&[b.rel(b.name("s"), RelOp::Gt, b.int(100))]),
    ]);
    let body = b.block(&[
        b.if_stmt(skip, b.continue_stmt(), None),
        b.assign(
            b.var("s"),
            b.binary(
                BinaryOp::Add,
                b.name("s"),
                b.binary(BinaryOp::Mul, b.name("i"), b.int(k)),
            ),
        ),
    ]);
    b.method(
        Some(b.ty("int")),
        &format!("f{k}"),
        &[b.param(b.ty("int"), "v")],
        &[b.var_decl(b.ty("int"), &[("i", false), ("s", false)])],
        &[
            b.assign(b.var("s"), b.int(0)),
            b.for_stmt(
                &[b.assign_ds(b.var("i"), b.int(0))],
                Some(b.cond1(b.rel(b.name("i"), RelOp::Lt, b.name("v")))),
                &[b.inc_ds(b.var("i"))],
                body,
            ),
            b.ret(Some(b.name("s"))),
        ],
    )
}

fn many_methods<'ast>(b: &AstBuilder<'ast>, count: i32) -> &'ast Program<'ast> {
    let mut methods: Vec<MethodDecl<'ast>> = (0..count).map(|k| looping_method(b, k)).collect();
    let calls: Vec<Stmt<'ast>> = (0..count)
        .map(|k| b.print(b.call_expr(b.var(&format!("f{k}")), &[b.int(10)]), None))
        .collect();
    methods.push(b.method(None, "main", &[], &[], &calls));
    b.program("Many", &[], &[], &methods)
}

/// A chain `C0 <- C1 <- ...` where every class adds a field and overrides `f`.
fn class_chain<'ast>(b: &AstBuilder<'ast>, depth: usize) -> &'ast Program<'ast> {
    let names: Vec<String> = (0..depth).map(|i| format!("C{i}")).collect();
    let classes: Vec<Decl<'ast>> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let field = format!("x{i}");
            let extends = i.checked_sub(1).map(|p| b.ty(&names[p]));
            b.class(
                name,
                extends,
                &[b.var_decl(b.ty("int"), &[(field.as_str(), false)])],
                &[b.method(
                    Some(b.ty("int")),
                    "f",
                    &[],
                    &[],
                    &[b.ret(Some(b.name(&field)))],
                )],
            )
        })
        .collect();

    let last = names.last().map(String::as_str).unwrap_or("C0");
    let main = b.method(
        None,
        "main",
        &[],
        &[b.var_decl(b.ty("C0"), &[("o", false)])],
        &[
            b.assign(b.var("o"), b.new_object(b.ty(last))),
            b.print(b.call_expr(b.field(b.var("o"), "f"), &[]), None),
        ],
    );
    b.program("Chain", &[], &classes, &[main])
}

/// One `if` whose condition has `terms` terms of three factors each.
fn wide_condition<'ast>(b: &AstBuilder<'ast>, terms: i32) -> &'ast Program<'ast> {
    let terms: Vec<CondTerm<'ast>> = (0..terms)
        .map(|t| {
            b.term(&[
                b.rel(b.name("a"), RelOp::Gt, b.int(t)),
                b.rel(b.name("a"), RelOp::Lt, b.int(t + 10)),
                b.rel(b.name("a"), RelOp::Ne, b.int(t + 5)),
            ])
        })
        .collect();
    let main = b.method(
        None,
        "main",
        &[b.var_decl(b.ty("int"), &[("a", false)])],
        &[
            b.read(b.var("a")),
            b.if_stmt(
                b.cond(&terms),
                b.print(b.name("a"), None),
                Some(b.print(b.int(0), None)),
            ),
        ],
    );
    b.program("Wide", &[], &[], &[main])
}

// ============================================================================
// Benchmarks
// ============================================================================

/// Benchmark compile time across program sizes.
fn size_based_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let compiler = Compiler::new();
    let mut group = c.benchmark_group("compile/sizes");

    for count in [1, 10, 50, 200] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = many_methods(&b, count);

        group.throughput(Throughput::Elements(b.node_count() as u64));
        group.bench_function(format!("methods_{count}"), |bench| {
            bench.iter(|| {
                let result = compiler.compile(black_box(program)).unwrap();
                end_profiling_frame();
                black_box(result.object.map(|o| o.chunk.len()))
            });
        });
    }

    group.finish();
    print_profiling_stats();
}

/// Benchmark specific language features.
fn feature_specific_benchmarks(c: &mut Criterion) {
    let compiler = Compiler::new();
    let mut group = c.benchmark_group("compile/features");

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let chain = class_chain(&b, 32);
    group.bench_function("class_chain_32", |bench| {
        bench.iter(|| black_box(compiler.compile(black_box(chain)).unwrap()));
    });

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let wide = wide_condition(&b, 64);
    group.bench_function("wide_condition_64", |bench| {
        bench.iter(|| black_box(compiler.compile(black_box(wide)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, size_based_benchmarks, feature_specific_benchmarks);
criterion_main!(benches);
