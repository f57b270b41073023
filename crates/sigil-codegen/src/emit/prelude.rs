//! The runtime prelude inlined into every emitted unit (spec §4.7).
//! Hand-written JS text rather than AST-built: it is fixed, ships with
//! every compilation, and never varies with the source program.

pub const PRELUDE: &str = r#"// --- sigil runtime prelude ---
function __sigil_preview(value) {
  try {
    const text = JSON.stringify(value);
    if (text === undefined) return String(value);
    return text.length > 120 ? text.slice(0, 117) + '...' : text;
  } catch (_e) {
    return String(value);
  }
}

function __sigil_diff_hint(actual, expected) {
  if (Array.isArray(actual) && Array.isArray(expected)) {
    if (actual.length !== expected.length) return 'array_length';
    for (let i = 0; i < actual.length; i++) {
      if (JSON.stringify(actual[i]) !== JSON.stringify(expected[i])) return 'array_first_diff';
    }
    return null;
  }
  if (actual && expected && typeof actual === 'object' && typeof expected === 'object') {
    const ak = Object.keys(actual).sort();
    const ek = Object.keys(expected).sort();
    if (JSON.stringify(ak) !== JSON.stringify(ek)) return 'object_keys';
    return 'object_field';
  }
  return null;
}

function __sigil_test_bool_result(value) {
  if (value === true) return { status: 'pass' };
  return { status: 'fail', failure: { kind: 'assert_false' } };
}

function __sigil_test_compare_result(op, left, right) {
  const ok =
    op === '=' ? left === right :
    op === '≠' ? left !== right :
    op === '<' ? left < right :
    op === '>' ? left > right :
    op === '≤' ? left <= right :
    op === '≥' ? left >= right : false;
  if (ok) return { status: 'pass' };
  return {
    status: 'fail',
    failure: {
      kind: 'comparison_mismatch',
      operator: op,
      actual: __sigil_preview(left),
      expected: __sigil_preview(right),
      diffHint: __sigil_diff_hint(left, right),
    },
  };
}

const __sigil_mock_table = new Map();

async function __sigil_call(name, fn, args) {
  const stack = __sigil_mock_table.get(name);
  const target = stack && stack.length > 0 ? stack[stack.length - 1] : fn;
  return await target(...args);
}

async function __sigil_with_mock(name, replacement, body) {
  const stack = __sigil_mock_table.get(name) || [];
  stack.push(replacement);
  __sigil_mock_table.set(name, stack);
  try {
    return await body();
  } finally {
    stack.pop();
  }
}

async function __sigil_with_mock_extern(name, original, replacement, body) {
  if (original.length !== replacement.length) {
    throw new Error(`mock for '${name}' does not match extern arity`);
  }
  return __sigil_with_mock(name, replacement, body);
}

async function __sigil_filter(list, pred) {
  const out = [];
  for (const item of list) {
    if (await pred(item)) out.push(item);
  }
  return out;
}

async function __sigil_fold(list, fn, init) {
  let acc = init;
  for (const item of list) {
    acc = await fn(acc, item);
  }
  return acc;
}
// --- end sigil runtime prelude ---
"#;
