//! Intra-file call graph and dependency layering.
//!
//! The graph is a deliberately conservative signal: only direct calls where
//! the callee is a bare local name are recorded — calls through values,
//! selectors, or interface methods are invisible. That is enough to rank
//! siblings stably without doing real reachability analysis.
//!
//! Layers come from collapsing the graph into strongly connected components
//! (hand-rolled Tarjan), then taking the longest path to a sink over the
//! acyclic condensation. Mutual recursion therefore shares one layer and
//! can never loop the traversal.

use std::collections::{HashMap, HashSet};

use crate::ast::{Block, Expr, FuncDecl, ForHeader, Stmt};

/// For each function, the local siblings it calls directly (self-calls
/// excluded). Every function in `funcs` gets an entry, callers with no
/// local callees included.
pub fn build_call_graph(
    funcs: &[FuncDecl],
    local: &HashSet<String>,
) -> HashMap<String, Vec<String>> {
    let mut graph = HashMap::new();

    for func in funcs {
        let mut callees = Vec::new();
        if let Some(body) = &func.body {
            collect_block(body, &mut |callee| {
                if local.contains(callee) && callee != func.name {
                    callees.push(callee.to_string());
                }
            });
        }
        graph.insert(func.name.clone(), callees);
    }

    graph
}

/// Assigns every name a layer: 0 for call-graph leaves, otherwise one more
/// than the deepest local callee, computed over the SCC condensation.
pub fn assign_layers(
    graph: &HashMap<String, Vec<String>>,
    names: &HashSet<String>,
) -> HashMap<String, usize> {
    // Sorted node numbering keeps the whole computation deterministic.
    let mut nodes: Vec<&String> = names.iter().collect();
    nodes.sort();
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut adj = vec![Vec::new(); nodes.len()];
    for (caller, callees) in graph {
        let Some(&from) = index.get(caller.as_str()) else {
            continue;
        };
        for callee in callees {
            if let Some(&to) = index.get(callee.as_str()) {
                adj[from].push(to);
            }
        }
    }

    let sccs = tarjan_scc(&adj);

    let mut scc_of = vec![0usize; nodes.len()];
    for (id, component) in sccs.iter().enumerate() {
        for &node in component {
            scc_of[node] = id;
        }
    }

    let mut cond_edges = vec![Vec::new(); sccs.len()];
    for (from, callees) in adj.iter().enumerate() {
        for &to in callees {
            if scc_of[from] != scc_of[to] {
                cond_edges[scc_of[from]].push(scc_of[to]);
            }
        }
    }

    let mut memo = vec![None; sccs.len()];
    for id in 0..sccs.len() {
        scc_layer(id, &cond_edges, &mut memo);
    }

    nodes
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let layer = memo[scc_of[i]].unwrap_or(0);
            ((*name).clone(), layer)
        })
        .collect()
}

fn scc_layer(id: usize, edges: &[Vec<usize>], memo: &mut Vec<Option<usize>>) -> usize {
    if let Some(layer) = memo[id] {
        return layer;
    }
    // The condensation is acyclic, so marking before recursing is not
    // needed for termination, only memoization.
    let mut layer = 0;
    for &child in &edges[id] {
        layer = layer.max(scc_layer(child, edges, memo) + 1);
    }
    memo[id] = Some(layer);
    layer
}

fn tarjan_scc(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    struct State<'a> {
        adj: &'a [Vec<usize>],
        index: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next_index: usize,
        sccs: Vec<Vec<usize>>,
    }

    fn strongconnect(state: &mut State, v: usize) {
        state.index[v] = Some(state.next_index);
        state.lowlink[v] = state.next_index;
        state.next_index += 1;
        state.stack.push(v);
        state.on_stack[v] = true;

        for i in 0..state.adj[v].len() {
            let w = state.adj[v][i];
            if state.index[w].is_none() {
                strongconnect(state, w);
                state.lowlink[v] = state.lowlink[v].min(state.lowlink[w]);
            } else if state.on_stack[w] {
                state.lowlink[v] = state.lowlink[v].min(state.index[w].unwrap_or(0));
            }
        }

        if Some(state.lowlink[v]) == state.index[v] {
            let mut component = Vec::new();
            while let Some(w) = state.stack.pop() {
                state.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            state.sccs.push(component);
        }
    }

    let n = adj.len();
    let mut state = State {
        adj,
        index: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next_index: 0,
        sccs: Vec::new(),
    };
    for v in 0..n {
        if state.index[v].is_none() {
            strongconnect(&mut state, v);
        }
    }
    state.sccs
}

// ----- conservative call-site scan ----------------------------------------

fn collect_block(block: &Block, sink: &mut impl FnMut(&str)) {
    for stmt in &block.stmts {
        collect_stmt(stmt, sink);
    }
}

fn collect_stmt(stmt: &Stmt, sink: &mut impl FnMut(&str)) {
    match stmt {
        Stmt::Expr { expr, .. } | Stmt::IncDec { expr, .. } => collect_expr(expr, sink),
        Stmt::Send { chan, value, .. } => {
            collect_expr(chan, sink);
            collect_expr(value, sink);
        }
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs.iter()) {
                collect_expr(expr, sink);
            }
        }
        Stmt::Decl { decl, .. } => {
            for spec in &decl.specs {
                if let crate::ast::Spec::Value(vs) = spec {
                    for value in &vs.values {
                        collect_expr(value, sink);
                    }
                }
            }
        }
        Stmt::Return { values, .. } => {
            for expr in values {
                collect_expr(expr, sink);
            }
        }
        Stmt::Branch { .. } => {}
        Stmt::Labeled { stmt, .. } => collect_stmt(stmt, sink),
        Stmt::Go { call, .. } | Stmt::Defer { call, .. } => collect_expr(call, sink),
        Stmt::If(s) => {
            if let Some(init) = &s.init {
                collect_stmt(init, sink);
            }
            collect_expr(&s.cond, sink);
            collect_block(&s.then, sink);
            if let Some(else_branch) = &s.else_branch {
                collect_stmt(else_branch, sink);
            }
        }
        Stmt::For(s) => {
            match &s.header {
                ForHeader::Forever => {}
                ForHeader::Cond(cond) => collect_expr(cond, sink),
                ForHeader::Clause { init, cond, post } => {
                    if let Some(init) = init {
                        collect_stmt(init, sink);
                    }
                    if let Some(cond) = cond {
                        collect_expr(cond, sink);
                    }
                    if let Some(post) = post {
                        collect_stmt(post, sink);
                    }
                }
                ForHeader::Range {
                    key, value, expr, ..
                } => {
                    if let Some(key) = key {
                        collect_expr(key, sink);
                    }
                    if let Some(value) = value {
                        collect_expr(value, sink);
                    }
                    collect_expr(expr, sink);
                }
            }
            collect_block(&s.body, sink);
        }
        Stmt::Switch(s) => {
            if let Some(init) = &s.init {
                collect_stmt(init, sink);
            }
            if let Some(subject) = &s.subject {
                collect_stmt(subject, sink);
            }
            for case in &s.cases {
                for expr in &case.exprs {
                    collect_expr(expr, sink);
                }
                for stmt in &case.body {
                    collect_stmt(stmt, sink);
                }
            }
        }
        Stmt::Select(s) => {
            for case in &s.cases {
                if let Some(comm) = &case.comm {
                    collect_stmt(comm, sink);
                }
                for stmt in &case.body {
                    collect_stmt(stmt, sink);
                }
            }
        }
        Stmt::Block { block, .. } => collect_block(block, sink),
    }
}

fn collect_expr(expr: &Expr, sink: &mut impl FnMut(&str)) {
    match expr {
        Expr::Ident(_) | Expr::Lit(_) | Expr::Type(_) => {}
        Expr::Selector(x, _) => collect_expr(x, sink),
        Expr::Index(x, index) => {
            collect_expr(x, sink);
            collect_expr(index, sink);
        }
        Expr::SliceExpr { x, low, high, max } => {
            collect_expr(x, sink);
            for part in [low, high, max].into_iter().flatten() {
                collect_expr(part, sink);
            }
        }
        Expr::Call { func, args, .. } => {
            if let Expr::Ident(name) = func.as_ref() {
                sink(name);
            } else {
                collect_expr(func, sink);
            }
            for arg in args {
                collect_expr(arg, sink);
            }
        }
        Expr::Unary(_, x) | Expr::Star(x) | Expr::Paren(x) => collect_expr(x, sink),
        Expr::Binary(lhs, _, rhs) => {
            collect_expr(lhs, sink);
            collect_expr(rhs, sink);
        }
        Expr::Composite(lit) => {
            for elem in &lit.elems {
                if let Some(key) = &elem.key {
                    collect_expr(key, sink);
                }
                collect_expr(&elem.value, sink);
            }
        }
        Expr::FuncLit(_, body) => collect_block(body, sink),
        Expr::TypeAssert(x, _) => collect_expr(x, sink),
    }
}
