use monkey::run;
use monkey::object::Object;

#[test]
fn test_basic_closure() {
    let source = r#"
        let x = 10;
        let makeClosure = fn() {
            let y = 5;
            let inner = fn() {
                return x + y;
            };
            return inner;
        };
        let closure = makeClosure();
        closure()
    "#;
    let result = run(source).expect("Execution failed");
    assert_eq!(result, Object::Integer(15));
}

#[test]
fn test_adder_factory() {
    let source = r#"
        let newAdder = fn(x) { fn(y) { x + y } };
        let addTwo = newAdder(2);
        let addTen = newAdder(10);
        addTwo(3) * addTen(0)
    "#;
    let result = run(source).expect("Execution failed");
    assert_eq!(result, Object::Integer(50));
}

#[test]
fn test_captured_scope_outlives_call() {
    // 'a' lives in makeGetter's call scope, which is gone by the time f runs
    let source = r#"
        let makeGetter = fn() {
            let a = 42;
            fn() { a }
        };
        let f = makeGetter();
        f()
    "#;
    let result = run(source).expect("Execution failed");
    assert_eq!(result, Object::Integer(42));
}

#[test]
fn test_closure_sees_its_own_scope_not_callers() {
    let source = r#"
        let x = 1;
        let getX = fn() { x };
        let callWithX = fn(x) { getX() };
        callWithX(99)
    "#;
    let result = run(source).expect("Execution failed");
    assert_eq!(result, Object::Integer(1));
}

#[test]
fn test_higher_order_functions() {
    let source = r#"
        let twice = fn(f, x) { f(f(x)) };
        let inc = fn(n) { n + 1 };
        twice(inc, 5) + twice(fn(n) { n * 3 }, 1)
    "#;
    let result = run(source).expect("Execution failed");
    assert_eq!(result, Object::Integer(16));
}

#[test]
fn test_recursive_closure() {
    let source = r#"
        let countdown = fn(n) {
            if (n == 0) { return 0; }
            countdown(n - 1)
        };
        countdown(50)
    "#;
    let result = run(source).expect("Execution failed");
    assert_eq!(result, Object::Integer(0));
}
