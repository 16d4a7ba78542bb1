// tests/codegen_tests.rs
//! End-to-end tests: compile programs and run them on the reference VM.


use bumpalo::Bump;
use mjc::ast::{AstBuilder, BinaryOp, Decl, RelOp};
use test_harness::*;

#[test]
fn hello_prints_wide_ints() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = main_with(
        &b,
        &[],
        &[b.print(b.int(42), None), b.print(b.name("eol"), None)],
    );

    assert_eq!(run(b.program("Hello", &[], &[], &[main])), "   42\n");
}

#[test]
fn object_file_header() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let decls = [Decl::Var(b.var_decl(b.ty("int"), &[("g", false)]))];
    let object = compile_ok(b.program("P", &[], &decls, &[main_with(&b, &[], &[])]));
    let bytes = object.to_bytes();

    assert_eq!(&bytes[..2], b"MJ");
    assert_eq!(&bytes[2..6], &(object.chunk.len() as u32).to_be_bytes());
    assert_eq!(&bytes[6..10], &1u32.to_be_bytes());
    assert_eq!(&bytes[10..14], &object.main_pc.to_be_bytes());
    assert_eq!(bytes.len(), 14 + object.chunk.len());
}

#[test]
fn exactly_one_branch_runs() {
    for (value, expected) in [(1, "1"), (5, "2")] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = main_with(
            &b,
            &[b.var_decl(b.ty("int"), &[("i", false)])],
            &[
                b.assign(b.var("i"), b.int(value)),
                b.if_stmt(
                    b.cond1(b.rel(b.name("i"), RelOp::Lt, b.int(3))),
                    b.print(b.int(1), Some(1)),
                    Some(b.print(b.int(2), Some(1))),
                ),
            ],
        );

        assert_eq!(run(b.program("P", &[], &[], &[main])), expected);
    }
}

/// `int hit(int v) { print(v, 1); return v; }`
fn hit<'ast>(b: &AstBuilder<'ast>) -> mjc::ast::MethodDecl<'ast> {
    b.method(
        Some(b.ty("int")),
        "hit",
        &[b.param(b.ty("int"), "v")],
        &[],
        &[b.print(b.name("v"), Some(1)), b.ret(Some(b.name("v")))],
    )
}

#[test]
fn or_skips_the_second_operand() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let first = b.term(&[b.rel(b.call_expr(b.var("hit"), &[b.int(1)]), RelOp::Eq, b.int(1))]);
    let second = b.term(&[b.rel(b.call_expr(b.var("hit"), &[b.int(2)]), RelOp::Eq, b.int(2))]);
    let main = main_with(
        &b,
        &[],
        &[b.if_stmt(b.cond(&[first, second]), b.print(b.chr(b'y'), None), None)],
    );

    assert_eq!(run(b.program("P", &[], &[], &[hit(&b), main])), "1y");
}

#[test]
fn or_falls_through_to_the_second_operand() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let first = b.term(&[b.rel(b.call_expr(b.var("hit"), &[b.int(0)]), RelOp::Eq, b.int(1))]);
    let second = b.term(&[b.rel(b.call_expr(b.var("hit"), &[b.int(2)]), RelOp::Eq, b.int(2))]);
    let main = main_with(
        &b,
        &[],
        &[b.if_stmt(
            b.cond(&[first, second]),
            b.print(b.chr(b'y'), None),
            Some(b.print(b.chr(b'n'), None)),
        )],
    );

    assert_eq!(run(b.program("P", &[], &[], &[hit(&b), main])), "02y");
}

#[test]
fn and_skips_the_second_operand() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let term = b.term(&[
        b.rel(b.call_expr(b.var("hit"), &[b.int(0)]), RelOp::Eq, b.int(1)),
        b.rel(b.call_expr(b.var("hit"), &[b.int(2)]), RelOp::Eq, b.int(2)),
    ]);
    let main = main_with(
        &b,
        &[],
        &[b.if_stmt(
            b.cond(&[term]),
            b.print(b.chr(b'y'), None),
            Some(b.print(b.chr(b'n'), None)),
        )],
    );

    assert_eq!(run(b.program("P", &[], &[], &[hit(&b), main])), "0n");
}

#[test]
fn bool_facts_compare_against_false() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("bool"), &[("ok", false)])],
        &[
            b.assign(b.var("ok"), b.bool(true)),
            b.if_stmt(b.cond1(b.fact(b.name("ok"))), b.print(b.name("ok"), None), None),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[], &[main])), "1");
}

#[test]
fn nested_loops_break_and_continue_the_innermost() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let inner = b.for_stmt(
        &[b.assign_ds(b.var("j"), b.int(0))],
        Some(b.cond1(b.rel(b.name("j"), RelOp::Lt, b.int(3)))),
        &[b.inc_ds(b.var("j"))],
        b.block(&[
            b.if_stmt(
                b.cond1(b.rel(b.name("j"), RelOp::Eq, b.int(1))),
                b.continue_stmt(),
                None,
            ),
            b.if_stmt(
                b.cond1(b.rel(b.name("j"), RelOp::Eq, b.int(2))),
                b.break_stmt(),
                None,
            ),
            b.print(b.name("j"), Some(1)),
        ]),
    );
    let outer = b.for_stmt(
        &[b.assign_ds(b.var("i"), b.int(0))],
        Some(b.cond1(b.rel(b.name("i"), RelOp::Lt, b.int(3)))),
        &[b.inc_ds(b.var("i"))],
        b.block(&[inner, b.print(b.name("i"), Some(1))]),
    );
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("int"), &[("i", false), ("j", false)])],
        &[outer],
    );

    assert_eq!(run(b.program("P", &[], &[], &[main])), "000102");
}

#[test]
fn loop_with_break_at_three() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let lp = b.for_stmt(
        &[b.assign_ds(b.var("i"), b.int(0))],
        Some(b.cond1(b.rel(b.name("i"), RelOp::Lt, b.int(5)))),
        &[b.inc_ds(b.var("i"))],
        b.block(&[
            b.if_stmt(
                b.cond1(b.rel(b.name("i"), RelOp::Eq, b.int(3))),
                b.break_stmt(),
                None,
            ),
            b.print(b.name("i"), Some(1)),
        ]),
    );
    let main = main_with(&b, &[b.var_decl(b.ty("int"), &[("i", false)])], &[lp]);

    assert_eq!(run(b.program("P", &[], &[], &[main])), "012");
}

#[test]
fn recursion() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let fact = b.method(
        Some(b.ty("int")),
        "fact",
        &[b.param(b.ty("int"), "n")],
        &[],
        &[
            b.if_stmt(
                b.cond1(b.rel(b.name("n"), RelOp::Le, b.int(1))),
                b.ret(Some(b.int(1))),
                None,
            ),
            b.ret(Some(b.binary(
                BinaryOp::Mul,
                b.name("n"),
                b.call_expr(
                    b.var("fact"),
                    &[b.binary(BinaryOp::Sub, b.name("n"), b.int(1))],
                ),
            ))),
        ],
    );
    let main = main_with(
        &b,
        &[],
        &[b.print(b.call_expr(b.var("fact"), &[b.int(5)]), None)],
    );

    assert_eq!(run(b.program("P", &[], &[], &[fact, main])), "  120");
}

#[test]
fn falling_off_a_function_traps() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let f = b.method(
        Some(b.ty("int")),
        "f",
        &[b.param(b.ty("int"), "v")],
        &[],
        &[b.if_stmt(
            b.cond1(b.rel(b.name("v"), RelOp::Gt, b.int(0))),
            b.ret(Some(b.int(1))),
            None,
        )],
    );
    let main = main_with(
        &b,
        &[],
        &[
            b.print(b.call_expr(b.var("f"), &[b.int(1)]), Some(1)),
            b.print(b.call_expr(b.var("f"), &[b.int(0)]), Some(1)),
        ],
    );
    let object = compile_ok(b.program("P", &[], &[], &[f, main]));

    let (output, result) = Vm::load(&object.to_bytes()).run_partial();
    assert_eq!(output, "1");
    assert_eq!(result, Err(VmError::Trap(1)));
}

#[test]
fn read_ints_and_chars() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = main_with(
        &b,
        &[
            b.var_decl(b.ty("int"), &[("x", false)]),
            b.var_decl(b.ty("char"), &[("c", false)]),
        ],
        &[
            b.read(b.var("x")),
            b.read(b.var("c")),
            b.print(b.binary(BinaryOp::Mul, b.name("x"), b.int(2)), None),
            b.print(b.name("c"), None),
        ],
    );

    assert_eq!(
        run_with_input(b.program("P", &[], &[], &[main]), "17z"),
        "   34z"
    );
}

#[test]
fn builtins() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("int"), &[("a", true)])],
        &[
            b.assign(b.var("a"), b.new_array(b.ty("int"), b.int(3))),
            b.print(b.call_expr(b.var("chr"), &[b.int(65)]), None),
            b.print(b.call_expr(b.var("ord"), &[b.chr(b'a')]), None),
            b.print(b.call_expr(b.var("len"), &[b.name("a")]), None),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[], &[main])), "A   97    3");
}

#[test]
fn char_arrays() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("char"), &[("s", true)])],
        &[
            b.assign(b.var("s"), b.new_array(b.ty("char"), b.int(2))),
            b.assign(b.index(b.var("s"), b.int(0)), b.chr(b'h')),
            b.assign(b.index(b.var("s"), b.int(1)), b.chr(b'i')),
            b.print(b.load(b.index(b.var("s"), b.int(0))), None),
            b.print(b.load(b.index(b.var("s"), b.int(1))), None),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[], &[main])), "hi");
}

#[test]
fn global_and_element_increments() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let decls = [Decl::Var(b.var_decl(b.ty("int"), &[("g", false), ("a", true)]))];
    let main = main_with(
        &b,
        &[],
        &[
            b.assign(b.var("g"), b.int(10)),
            b.inc(b.var("g")),
            b.inc(b.var("g")),
            b.dec(b.var("g")),
            b.assign(b.var("a"), b.new_array(b.ty("int"), b.int(2))),
            b.inc(b.index(b.var("a"), b.int(1))),
            b.dec(b.index(b.var("a"), b.int(0))),
            b.print(b.name("g"), Some(3)),
            b.print(b.load(b.index(b.var("a"), b.int(0))), Some(3)),
            b.print(b.load(b.index(b.var("a"), b.int(1))), Some(3)),
        ],
    );

    assert_eq!(run(b.program("P", &[], &decls, &[main])), " 11 -1  1");
}

// ============================================================================
// Unpack
// ============================================================================

/// `s = new int[len]; for (i = 0; i < len; i++) s[i] = i * step;`
fn fill<'ast>(b: &AstBuilder<'ast>, len: i32, step: i32) -> [mjc::ast::Stmt<'ast>; 2] {
    [
        b.assign(b.var("s"), b.new_array(b.ty("int"), b.int(len))),
        b.for_stmt(
            &[b.assign_ds(b.var("i"), b.int(0))],
            Some(b.cond1(b.rel(b.name("i"), RelOp::Lt, b.int(len)))),
            &[b.inc_ds(b.var("i"))],
            b.assign(
                b.index(b.var("s"), b.name("i")),
                b.binary(BinaryOp::Mul, b.name("i"), b.int(step)),
            ),
        ),
    ]
}

fn unpack_locals<'ast>(b: &AstBuilder<'ast>) -> [mjc::ast::VarDecl<'ast>; 2] {
    [
        b.var_decl(b.ty("int"), &[("x", false), ("y", false), ("i", false)]),
        b.var_decl(b.ty("int"), &[("s", true), ("d", true)]),
    ]
}

#[test]
fn unpack_copies_targets_and_rest() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let [make, fill_loop] = fill(&b, 5, 10);
    let main = main_with(
        &b,
        &unpack_locals(&b),
        &[
            make,
            fill_loop,
            b.assign(b.var("d"), b.new_array(b.ty("int"), b.int(2))),
            b.unpack(&[Some(b.var("x")), Some(b.var("y"))], b.var("d"), b.var("s")),
            b.print(b.name("x"), Some(3)),
            b.print(b.name("y"), Some(3)),
            b.print(b.load(b.index(b.var("d"), b.int(0))), Some(3)),
            b.print(b.load(b.index(b.var("d"), b.int(1))), Some(3)),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[], &[main])), "  0 10 20 30");
}

#[test]
fn unpack_blank_positions_still_count() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let [make, fill_loop] = fill(&b, 4, 1);
    let main = main_with(
        &b,
        &unpack_locals(&b),
        &[
            make,
            fill_loop,
            b.assign(b.var("d"), b.new_array(b.ty("int"), b.int(2))),
            b.unpack(&[Some(b.var("x")), None], b.var("d"), b.var("s")),
            b.print(b.name("x"), Some(1)),
            b.print(b.load(b.index(b.var("d"), b.int(0))), Some(1)),
            b.print(b.load(b.index(b.var("d"), b.int(1))), Some(1)),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[], &[main])), "023");
}

#[test]
fn unpack_traps_when_the_source_is_short() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let [make, fill_loop] = fill(&b, 3, 1);
    let main = main_with(
        &b,
        &unpack_locals(&b),
        &[
            make,
            fill_loop,
            b.assign(b.var("d"), b.new_array(b.ty("int"), b.int(2))),
            b.print(b.chr(b'>'), None),
            b.unpack(&[Some(b.var("x")), Some(b.var("y"))], b.var("d"), b.var("s")),
            b.print(b.chr(b'!'), None),
        ],
    );
    let object = compile_ok(b.program("P", &[], &[], &[main]));

    let (output, result) = Vm::load(&object.to_bytes()).run_partial();
    assert_eq!(output, ">");
    assert_eq!(result, Err(VmError::Trap(2)));
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn virtual_dispatch_picks_the_override() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let a = b.class(
        "A",
        None,
        &[],
        &[
            b.method(None, "f", &[], &[], &[b.print(b.int(1), Some(1))]),
            b.method(None, "g", &[], &[], &[b.print(b.int(3), Some(1))]),
        ],
    );
    let bc = b.class(
        "B",
        Some(b.ty("A")),
        &[],
        &[b.method(None, "f", &[], &[], &[b.print(b.int(2), Some(1))])],
    );
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("A"), &[("x", false)])],
        &[
            b.assign(b.var("x"), b.new_object(b.ty("B"))),
            b.call_stmt(b.field(b.var("x"), "f"), &[]),
            b.call_stmt(b.field(b.var("x"), "g"), &[]),
            b.assign(b.var("x"), b.new_object(b.ty("A"))),
            b.call_stmt(b.field(b.var("x"), "f"), &[]),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[a, bc], &[main])), "231");
}

#[test]
fn override_receives_its_arguments() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let a = b.class(
        "A",
        None,
        &[],
        &[b.method(
            None,
            "show",
            &[b.param(b.ty("int"), "k")],
            &[],
            &[b.print(b.name("k"), Some(1))],
        )],
    );
    let bc = b.class(
        "B",
        Some(b.ty("A")),
        &[],
        &[b.method(
            None,
            "show",
            &[b.param(b.ty("int"), "k")],
            &[],
            &[b.print(b.binary(BinaryOp::Mul, b.name("k"), b.int(2)), Some(1))],
        )],
    );
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("B"), &[("x", false)])],
        &[
            b.assign(b.var("x"), b.new_object(b.ty("B"))),
            b.call_stmt(b.field(b.var("x"), "show"), &[b.int(4)]),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[a, bc], &[main])), "8");
}

/// `int cnt; A[] arr;` with `int next() { cnt++; return 0; }`, and a class
/// `A` whose methods print what they are given.
fn counted_receivers<'ast>(
    b: &AstBuilder<'ast>,
    body: &[mjc::ast::Stmt<'ast>],
) -> &'ast mjc::ast::Program<'ast> {
    let a = b.class(
        "A",
        None,
        &[],
        &[
            b.method(None, "f", &[], &[], &[b.print(b.int(9), Some(1))]),
            b.method(
                None,
                "g",
                &[b.param(b.ty("int"), "k")],
                &[],
                &[b.print(b.name("k"), Some(1))],
            ),
            b.method(
                Some(b.ty("int")),
                "h",
                &[],
                &[],
                &[b.print(b.int(5), Some(1)), b.ret(Some(b.int(2)))],
            ),
        ],
    );
    let decls = [
        a,
        Decl::Var(b.var_decl(b.ty("int"), &[("cnt", false)])),
        Decl::Var(b.var_decl(b.ty("A"), &[("arr", true)])),
    ];
    let next = b.method(
        Some(b.ty("int")),
        "next",
        &[],
        &[],
        &[b.inc(b.var("cnt")), b.ret(Some(b.int(0)))],
    );
    let mut stmts = vec![
        b.assign(b.var("arr"), b.new_array(b.ty("A"), b.int(1))),
        b.assign(b.index(b.var("arr"), b.int(0)), b.new_object(b.ty("A"))),
    ];
    stmts.extend_from_slice(body);
    stmts.push(b.print(b.name("cnt"), Some(1)));
    b.program("P", &[], &decls, &[next, main_with(b, &[], &stmts)])
}

/// `arr[next()]`
fn computed<'ast>(b: &AstBuilder<'ast>, method: &str) -> &'ast mjc::ast::Designator<'ast> {
    let elem = b.index(b.var("arr"), b.call_expr(b.var("next"), &[]));
    b.field(elem, method)
}

#[test]
fn computed_receiver_is_evaluated_once() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = counted_receivers(&b, &[b.call_stmt(computed(&b, "f"), &[])]);

    assert_eq!(run(program), "91");
}

#[test]
fn nested_computed_receivers_are_evaluated_once_each() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let inner = b.call_expr(computed(&b, "h"), &[]);
    let program = counted_receivers(&b, &[b.call_stmt(computed(&b, "g"), &[inner])]);

    // h prints 5 and returns 2 for g; next ran twice
    assert_eq!(run(program), "522");
}

#[test]
fn fields_and_instance_methods() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let counter = b.class(
        "Counter",
        None,
        &[b.var_decl(b.ty("int"), &[("n", false)])],
        &[
            b.method(
                None,
                "add",
                &[b.param(b.ty("int"), "k")],
                &[],
                &[b.assign(b.var("n"), b.binary(BinaryOp::Add, b.name("n"), b.name("k")))],
            ),
            b.method(Some(b.ty("int")), "get", &[], &[], &[b.ret(Some(b.name("n")))]),
        ],
    );
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("Counter"), &[("c", false)])],
        &[
            b.assign(b.var("c"), b.new_object(b.ty("Counter"))),
            b.call_stmt(b.field(b.var("c"), "add"), &[b.int(5)]),
            b.call_stmt(b.field(b.var("c"), "add"), &[b.int(2)]),
            b.inc(b.field(b.var("c"), "n")),
            b.print(b.call_expr(b.field(b.var("c"), "get"), &[]), None),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[counter], &[main])), "    8");
}

#[test]
fn inherited_fields_keep_their_offsets() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let base = b.class("Base", None, &[b.var_decl(b.ty("int"), &[("a", false)])], &[]);
    let derived = b.class(
        "Derived",
        Some(b.ty("Base")),
        &[b.var_decl(b.ty("int"), &[("b", false)])],
        &[],
    );
    let main = main_with(
        &b,
        &[b.var_decl(b.ty("Derived"), &[("d", false)])],
        &[
            b.assign(b.var("d"), b.new_object(b.ty("Derived"))),
            b.assign(b.field(b.var("d"), "a"), b.int(1)),
            b.assign(b.field(b.var("d"), "b"), b.int(2)),
            b.print(b.load(b.field(b.var("d"), "a")), Some(1)),
            b.print(b.load(b.field(b.var("d"), "b")), Some(1)),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[base, derived], &[main])), "12");
}

#[test]
fn statics_and_initializers() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let class = b.class_with_statics(
        "M",
        None,
        &[b.var_decl(b.ty("int"), &[("n", false)])],
        &[b.static_init(&[b.assign(b.var("n"), b.int(41))])],
        &[],
        &[b.static_method(
            Some(b.ty("int")),
            "sq",
            &[b.param(b.ty("int"), "v")],
            &[],
            &[b.ret(Some(b.binary(BinaryOp::Mul, b.name("v"), b.name("v"))))],
        )],
    );
    let main = main_with(
        &b,
        &[],
        &[
            b.inc(b.field(b.var("M"), "n")),
            b.print(b.load(b.field(b.var("M"), "n")), None),
            b.print(b.call_expr(b.field(b.var("M"), "sq"), &[b.int(3)]), None),
        ],
    );

    assert_eq!(run(b.program("P", &[], &[class], &[main])), "   42    9");
}

#[test]
fn namespaces() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let geo = b.namespace(
        "geo",
        &[Decl::Var(b.var_decl(b.ty("int"), &[("origin", false)]))],
        &[b.method(
            Some(b.ty("int")),
            "twice",
            &[b.param(b.ty("int"), "v")],
            &[],
            &[b.ret(Some(b.binary(BinaryOp::Mul, b.name("v"), b.int(2))))],
        )],
    );
    let main = main_with(
        &b,
        &[],
        &[
            b.assign(b.qualified("geo", "origin"), b.int(4)),
            b.print(
                b.call_expr(
                    b.qualified("geo", "twice"),
                    &[b.load(b.qualified("geo", "origin"))],
                ),
                None,
            ),
        ],
    );

    assert_eq!(run(b.program("P", &[geo], &[], &[main])), "    8");
}
