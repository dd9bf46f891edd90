#[cfg(test)]
mod mirror_tests {
    use jdb_eval::error::{EvalError, Result};
    use jdb_eval::expression::{assignment_expression, ExpressionParser};
    use jdb_eval::lvalue::ExpressionValue;
    use jdb_eval::memory::Memory;
    use jdb_eval::mirror::MirrorEvaluator;
    use jdb_eval::snapshot::Snapshot;
    use jdb_eval::value::Value;

    const SNAPSHOT: &str = r#"{
        "thread": { "name": "main", "suspended": true },
        "frame": {
            "declaring_class": "Counter",
            "this": 1,
            "locals": [
                { "name": "step",  "type": "int",              "value": { "type": "int", "value": 2 } },
                { "name": "arr",   "type": "int[]",            "value": { "type": "ref", "value": 2 } },
                { "name": "name",  "type": "java.lang.String", "value": { "type": "string", "value": "jdb" } },
                { "name": "ratio", "type": "double",           "value": { "type": "double", "value": 0.5 } },
                { "name": "b",     "type": "byte",             "value": { "type": "byte", "value": 1 } }
            ]
        },
        "heap": {
            "1": { "kind": "instance", "class": "Counter",
                   "fields": { "count": { "type": "int", "value": 5 },
                               "next":  { "type": "ref", "value": 3 } } },
            "2": { "kind": "array", "component": "int",
                   "elements": [ { "type": "int", "value": 10 },
                                 { "type": "int", "value": 20 },
                                 { "type": "int", "value": 30 } ] },
            "3": { "kind": "instance", "class": "Counter",
                   "fields": { "count": { "type": "int", "value": 7 } } }
        },
        "classes": {
            "Counter": {
                "superclass": "Base",
                "interfaces": [ "Limits" ],
                "fields": [
                    { "name": "count", "type": "int" },
                    { "name": "next",  "type": "Counter" },
                    { "name": "ID",    "type": "int", "final": true },
                    { "name": "total", "type": "long", "static": true,
                      "value": { "type": "long", "value": 100 } }
                ]
            },
            "Base": {
                "fields": [ { "name": "label", "type": "java.lang.String" } ]
            },
            "Limits": {
                "kind": "interface",
                "fields": [ { "name": "MAX", "type": "int", "static": true, "final": true,
                              "value": { "type": "int", "value": 64 } } ]
            }
        }
    }"#;

    fn snapshot() -> Snapshot {
        serde_json::from_str(SNAPSHOT).expect("fixture should deserialize")
    }

    fn memory() -> Memory {
        Memory::new(snapshot())
    }

    fn eval(memory: &Memory, source: &str) -> Result<Value> {
        let evaluator = MirrorEvaluator::new(memory);
        let mut parser = ExpressionParser::new_instance(source);

        parser.evaluate(&evaluator)
    }

    fn assert_evaluates(memory: &Memory, source: &str, expected: Value) {
        match eval(memory, source) {
            Ok(value) => assert_eq!(value, expected, "source: {}", source),
            Err(e) => panic!("{}: unexpected error: {}", source, e),
        }
    }

    fn evaluation_error(memory: &Memory, source: &str) -> String {
        match eval(memory, source) {
            Err(EvalError::Evaluation(message)) => message,
            other => panic!("{}: expected an evaluation error, got {:?}", source, other),
        }
    }

    fn text(s: &str) -> Value {
        Value::Str(s.to_string())
    }

    #[test]
    fn test_arithmetic_and_promotion() {
        let memory = memory();

        assert_evaluates(&memory, "count * step + 1", Value::Int(11));
        assert_evaluates(&memory, "7 / 2", Value::Int(3));
        assert_evaluates(&memory, "-7 % 3", Value::Int(-1));
        assert_evaluates(&memory, "step / 4", Value::Int(0));
        assert_evaluates(&memory, "step / 4.0", Value::Double(0.5));
        assert_evaluates(&memory, "ratio * 2", Value::Double(1.0));
        assert_evaluates(&memory, "1.5f * 2", Value::Float(3.0));
        assert_evaluates(&memory, "step + 1L", Value::Long(3));
        assert_evaluates(&memory, "'a' + 1", Value::Int(98));
        assert_evaluates(&memory, "b + b", Value::Int(2));
        assert_evaluates(&memory, "2147483647 + 1", Value::Int(i32::MIN));
    }

    #[test]
    fn test_bitwise_and_shift_operators() {
        let memory = memory();

        assert_evaluates(&memory, "6 & 3", Value::Int(2));
        assert_evaluates(&memory, "6 | 3", Value::Int(7));
        assert_evaluates(&memory, "6 ^ 3", Value::Int(5));
        assert_evaluates(&memory, "~5", Value::Int(-6));
        assert_evaluates(&memory, "1 << 33", Value::Int(2));
        assert_evaluates(&memory, "1L << 40", Value::Long(1 << 40));
        assert_evaluates(&memory, "-16 >> 2", Value::Int(-4));
        assert_evaluates(&memory, "-1 >>> 28", Value::Int(15));
    }

    #[test]
    fn test_division_by_zero() {
        let memory = memory();

        assert_eq!(evaluation_error(&memory, "step / 0"), "/ by zero");
        assert_eq!(evaluation_error(&memory, "step % 0L"), "/ by zero");
        assert_evaluates(&memory, "1.0 / 0", Value::Double(f64::INFINITY));
    }

    #[test]
    fn test_bad_operands() {
        let memory = memory();

        assert_eq!(
            evaluation_error(&memory, "true + 1"),
            "Bad operand types for binary operator '+': boolean and int"
        );
        assert_eq!(
            evaluation_error(&memory, "-name"),
            "Bad operand type java.lang.String for unary operator '-'"
        );
        assert!(evaluation_error(&memory, "!step").contains("unary operator '!'"));
    }

    #[test]
    fn test_comparisons_and_logic() {
        let memory = memory();

        assert_evaluates(&memory, "count > 3 && step < 3", Value::Boolean(true));
        assert_evaluates(&memory, "count > 3 == true", Value::Boolean(true));
        assert_evaluates(&memory, "ratio >= 0.5", Value::Boolean(true));
        assert_evaluates(&memory, "!(step == 2) || false", Value::Boolean(false));
        assert_evaluates(&memory, "true ^ true", Value::Boolean(false));
    }

    #[test]
    fn test_reference_equality() {
        let memory = memory();

        assert_evaluates(&memory, "next == next", Value::Boolean(true));
        assert_evaluates(&memory, "this == next", Value::Boolean(false));
        assert_evaluates(&memory, "next != null", Value::Boolean(true));
        assert_evaluates(&memory, "next.next == null", Value::Boolean(true));
        assert_evaluates(&memory, "name == \"jdb\"", Value::Boolean(true));
    }

    #[test]
    fn test_string_concatenation() {
        let memory = memory();

        assert_evaluates(&memory, "name + step", text("jdb2"));
        assert_evaluates(&memory, "\"x\" + 1.0", text("x1.0"));
        assert_evaluates(&memory, "1 + 2 + \"s\"", text("3s"));
        assert_evaluates(&memory, "\"s\" + 1 + 2", text("s12"));
        assert_evaluates(&memory, "\"v=\" + next", text("v=Counter@3"));
        assert_evaluates(&memory, "\"\" + null", text("null"));
    }

    #[test]
    fn test_string_methods() {
        let memory = memory();

        assert_evaluates(&memory, "name.length()", Value::Int(3));
        assert_evaluates(&memory, "name.toUpperCase()", text("JDB"));
        assert_evaluates(&memory, "name.charAt(1)", Value::Char('d'));
        assert_evaluates(&memory, "name.substring(1)", text("db"));
        assert_evaluates(&memory, "\"abc\".substring(1, 2)", text("b"));
        assert_evaluates(&memory, "name.indexOf(\"b\")", Value::Int(2));
        assert_evaluates(&memory, "name.equals(\"jdb\")", Value::Boolean(true));
        assert_evaluates(&memory, "name.concat(\"!\").length()", Value::Int(4));
        assert_evaluates(&memory, "\"  x \".trim()", text("x"));

        assert!(evaluation_error(&memory, "name.charAt(9)").contains("String index out of range"));
        assert_eq!(
            evaluation_error(&memory, "name.foo()"),
            "No applicable method 'foo' on java.lang.String"
        );
    }

    #[test]
    fn test_object_methods() {
        let memory = memory();

        assert_evaluates(&memory, "next.toString()", text("Counter@3"));
        assert_evaluates(&memory, "next.equals(next)", Value::Boolean(true));
        assert_eq!(
            evaluation_error(&memory, "next.next.toString()"),
            "Cannot invoke method toString on null"
        );
        assert_eq!(
            evaluation_error(&memory, "step.foo()"),
            "Value is not object. Cannot invoke method foo"
        );
    }

    #[test]
    fn test_field_resolution() {
        let memory = memory();

        assert_evaluates(&memory, "count", Value::Int(5));
        assert_evaluates(&memory, "this.count", Value::Int(5));
        assert_evaluates(&memory, "next.count", Value::Int(7));
        assert_evaluates(&memory, "label", Value::Null);
        assert_evaluates(&memory, "ID", Value::Int(0));

        assert!(evaluation_error(&memory, "step.x").starts_with("Value is not object"));
        assert_eq!(
            evaluation_error(&memory, "next.next.count"),
            "Value is not object. Cannot get field count of null"
        );
        assert!(matches!(
            eval(&memory, "nothing"),
            Err(EvalError::UnresolvedIdentifier { .. })
        ));
        assert!(matches!(
            eval(&memory, "name.x"),
            Err(EvalError::UnresolvedIdentifier { .. })
        ));
    }

    #[test]
    fn test_static_fields() {
        let memory = memory();

        assert_evaluates(&memory, "total", Value::Long(100));
        assert_evaluates(&memory, "next.total", Value::Long(100));
        assert_evaluates(&memory, "MAX", Value::Int(64));

        assert_evaluates(&memory, "total = total + 1", Value::Long(101));
        assert_evaluates(&memory, "total", Value::Long(101));
    }

    #[test]
    fn test_interface_static_is_immutable() {
        let memory = memory();

        assert!(matches!(
            eval(&memory, "MAX = 1"),
            Err(EvalError::StorageAccess(_))
        ));
        assert_evaluates(&memory, "MAX", Value::Int(64));
    }

    #[test]
    fn test_arrays() {
        let memory = memory();

        assert_evaluates(&memory, "arr[1]", Value::Int(20));
        assert_evaluates(&memory, "arr[step]", Value::Int(30));
        assert_evaluates(&memory, "arr.length", Value::Int(3));
        assert_evaluates(&memory, "arr[arr.length - 1] + arr[0]", Value::Int(40));

        for source in ["arr[3]", "arr[-1]"] {
            match eval(&memory, source) {
                Err(EvalError::StorageAccess(message)) => {
                    assert!(message.contains("out of bounds for length 3"), "{}", message)
                }
                other => panic!("{}: unexpected result {:?}", source, other),
            }
        }

        assert_eq!(
            evaluation_error(&memory, "step[0]"),
            "Value of type int is not an array"
        );
        assert!(matches!(
            eval(&memory, "arr[1.5]"),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_array_element_lvalue() {
        let memory = memory();
        let evaluator = MirrorEvaluator::new(&memory);
        let mut parser = ExpressionParser::new_instance("arr[0]");

        let mut element = parser.evaluate_value(&evaluator).unwrap();

        match &element {
            ExpressionValue::ArrayElement(e) => {
                assert_eq!(*e.array(), 2);
                assert_eq!(e.index(), 0);
            }
            other => panic!("expected an array element, got {:?}", other),
        }

        assert_eq!(element.value().unwrap(), Value::Int(10));

        element.set_value(Value::Int(99)).unwrap();

        assert_eq!(element.value().unwrap(), Value::Int(99));
        assert_evaluates(&memory, "arr[0]", Value::Int(99));
    }

    #[test]
    fn test_assignments_write_through() {
        let memory = memory();

        assert_evaluates(&memory, "step = 9", Value::Int(9));
        assert_evaluates(&memory, "step", Value::Int(9));

        assert_evaluates(&memory, "arr[1] = step * 100", Value::Int(900));
        assert_evaluates(&memory, "arr[1]", Value::Int(900));

        assert_evaluates(&memory, "label = \"x\"", text("x"));
        assert_evaluates(&memory, "label + name", text("xjdb"));

        assert_evaluates(&memory, "next = this", Value::Ref(1));
        assert_evaluates(&memory, "next.count", Value::Int(5));

        let frame = memory.snapshot().frame.expect("frame");
        assert_eq!(frame.locals[0].value, Value::Int(9));
    }

    #[test]
    fn test_compound_assignment_narrows_to_target() {
        let memory = memory();

        assert_evaluates(&memory, "count += step", Value::Int(7));
        assert_evaluates(&memory, "count", Value::Int(7));
        assert_evaluates(&memory, "b += 1", Value::Byte(2));
        assert_evaluates(&memory, "b *= 100", Value::Byte(-56));
        assert_evaluates(&memory, "step <<= 3", Value::Int(16));
        assert_evaluates(&memory, "name += step", text("jdb16"));
        assert_evaluates(&memory, "step += 3e10", Value::Int(i32::MAX));
        assert_evaluates(&memory, "b += 1e10", Value::Byte(-1));
        assert_evaluates(&memory, "count -= 0.0 / 0", Value::Int(0));
    }

    #[test]
    fn test_assignment_conversion_failures() {
        let memory = memory();

        for source in ["b = 300", "step = \"s\"", "step = 1L", "next = name", "ratio = true"] {
            assert!(
                matches!(eval(&memory, source), Err(EvalError::TypeMismatch { .. })),
                "{}",
                source
            );
        }

        assert_evaluates(&memory, "b", Value::Byte(1));
        assert_evaluates(&memory, "step", Value::Int(2));
    }

    #[test]
    fn test_immutable_targets() {
        let memory = memory();

        assert!(matches!(eval(&memory, "1 = 2"), Err(EvalError::ImmutableValue)));
        assert!(matches!(eval(&memory, "arr.length = 4"), Err(EvalError::ImmutableValue)));
        assert!(matches!(eval(&memory, "step + 1 = 4"), Err(EvalError::ImmutableValue)));

        match eval(&memory, "ID = 3") {
            Err(EvalError::StorageAccess(message)) => {
                assert_eq!(message, "Cannot modify final field 'ID'")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_assignment_path() {
        let memory = memory();
        let text = assignment_expression(&["next", "count"], "step * 21");

        assert_evaluates(&memory, &text, Value::Int(42));
        assert_evaluates(&memory, "next.count", Value::Int(42));

        let text = assignment_expression(&["arr", "[2]"], "-1");
        assert_evaluates(&memory, &text, Value::Int(-1));
        assert_evaluates(&memory, "arr[2]", Value::Int(-1));
    }

    #[test]
    fn test_ternary() {
        let memory = memory();

        assert_evaluates(&memory, "step > 1 ? \"big\" : \"small\"", text("big"));
        assert_evaluates(&memory, "step > 5 ? 1 : 2", Value::Int(2));
        assert_eq!(
            evaluation_error(&memory, "step ? 1 : 2"),
            "Invalid ternary operator."
        );
    }

    #[test]
    fn test_literals() {
        let memory = memory();

        assert_evaluates(&memory, "0xFF", Value::Int(255));
        assert_evaluates(&memory, "0xFFFFFFFF", Value::Int(-1));
        assert_evaluates(&memory, "0x7fffffffffffffffL", Value::Long(i64::MAX));
        assert_evaluates(&memory, "017", Value::Int(15));
        assert_evaluates(&memory, "10L", Value::Long(10));
        assert_evaluates(&memory, "2.5", Value::Double(2.5));
        assert_evaluates(&memory, "1e3", Value::Double(1000.0));
        assert_evaluates(&memory, "3d", Value::Double(3.0));
        assert_evaluates(&memory, "1.5f", Value::Float(1.5));
        assert_evaluates(&memory, r"'\n'", Value::Char('\n'));
        assert_evaluates(&memory, r"'A'", Value::Char('A'));
        assert_evaluates(&memory, r"'\101'", Value::Char('A'));
        assert_evaluates(&memory, r#""a\tb""#, text("a\tb"));
        assert_evaluates(&memory, "null", Value::Null);

        assert_eq!(
            evaluation_error(&memory, "2147483648"),
            "Integer number too large: 2147483648"
        );
    }

    #[test]
    fn test_condition_holds() {
        let memory = memory();
        let evaluator = MirrorEvaluator::new(&memory);

        let mut hit = ExpressionParser::new_instance("count > 3");
        let mut skip = ExpressionParser::new_instance("count == 6");
        let mut not_boolean = ExpressionParser::new_instance("count");
        let mut broken = ExpressionParser::new_instance("count >");

        assert!(evaluator.condition_holds(&mut hit).unwrap());
        assert!(evaluator.condition_holds(&mut hit).unwrap());
        assert_eq!(hit.compilations(), 1);

        assert!(!evaluator.condition_holds(&mut skip).unwrap());
        assert!(!evaluator.condition_holds(&mut not_boolean).unwrap());
        assert!(matches!(
            evaluator.condition_holds(&mut broken),
            Err(EvalError::Parse { .. })
        ));
    }

    #[test]
    fn test_null_receiver_never_reaches_statics() {
        let memory = memory();

        assert_evaluates(&memory, "next.next", Value::Null);
        assert_eq!(
            evaluation_error(&memory, "next.next.total"),
            "Value is not object. Cannot get field total of null"
        );
        assert_eq!(
            evaluation_error(&memory, "null.total = 5"),
            "Value is not object. Cannot get field total of null"
        );
        assert_evaluates(&memory, "total", Value::Long(100));

        let mut snapshot = snapshot();
        if let Some(frame) = snapshot.frame.as_mut() {
            frame.this = None;
        }
        let memory = Memory::new(snapshot);

        assert!(evaluation_error(&memory, "null.total").ends_with("field total of null"));
        assert_evaluates(&memory, "total", Value::Long(100));
    }

    #[test]
    fn test_static_frame() {
        let mut snapshot = snapshot();
        if let Some(frame) = snapshot.frame.as_mut() {
            frame.this = None;
        }
        let memory = Memory::new(snapshot);

        assert_evaluates(&memory, "this", Value::Class("Counter".to_string()));
        assert_evaluates(&memory, "total", Value::Long(100));
        assert_evaluates(&memory, "total = 7", Value::Int(7));
        assert_evaluates(&memory, "total", Value::Long(7));
        assert_evaluates(&memory, "step", Value::Int(2));
        assert!(matches!(
            eval(&memory, "count"),
            Err(EvalError::UnresolvedIdentifier { .. })
        ));
    }

    #[test]
    fn test_thread_must_be_suspended_with_a_frame() {
        let mut running = snapshot();
        running.thread.suspended = false;
        let memory = Memory::new(running);

        match eval(&memory, "step") {
            Err(EvalError::StorageAccess(message)) => {
                assert_eq!(message, "Thread 'main' is not suspended")
            }
            other => panic!("unexpected result {:?}", other),
        }

        let mut frameless = snapshot();
        frameless.frame = None;
        let memory = Memory::new(frameless);

        match eval(&memory, "1 + 1") {
            Err(EvalError::StorageAccess(message)) => {
                assert_eq!(message, "Thread 'main' has no stack frames")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_round_trips_after_assignment() {
        let memory = memory();

        assert_evaluates(&memory, "next.count = 1", Value::Int(1));

        let reloaded = Memory::from_json(&memory.to_json().unwrap()).unwrap();

        assert_evaluates(&reloaded, "next.count", Value::Int(1));
        assert_evaluates(&reloaded, "total", Value::Long(100));
        assert_eq!(reloaded.snapshot(), memory.snapshot());
    }
}
