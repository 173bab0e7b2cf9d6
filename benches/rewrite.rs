use criterion::{Criterion, black_box, criterion_group, criterion_main};

use phpantom_refactor::Workspace;
use phpantom_refactor::rewrite::rewrite_source;

/// A test class with `methods` test methods, each holding a mix of
/// rewritable and untouched assertions.
fn generate_test_file(methods: usize) -> String {
    let mut php = String::from(
        "<?php\nnamespace Tests;\n\nuse PHPUnit\\Framework\\TestCase;\n\nclass Magic { public function __isset($n) { return true; } }\nclass Plain { public ?int $value = null; }\n\nfinal class GeneratedTest extends TestCase\n{\n",
    );
    for i in 0..methods {
        php.push_str(&format!(
            "    public function test{i}(array $data): void\n    {{\n        $plain = new Plain();\n        $magic = new Magic();\n        $this->assertTrue(isset($data['key{i}']));\n        $this->assertFalse(isset($plain->value), 'message {i}');\n        $this->assertTrue(isset($magic->value));\n        $this->assertSame({i}, count($data));\n    }}\n\n"
        ));
    }
    php.push_str("}\n");
    php
}

fn bench_rewrite(c: &mut Criterion) {
    let small = generate_test_file(10);
    let large = generate_test_file(500);

    c.bench_function("rewrite_10_methods", |b| {
        b.iter(|| rewrite_source(&Workspace::new(), black_box(&small)))
    });
    c.bench_function("rewrite_500_methods", |b| {
        b.iter(|| rewrite_source(&Workspace::new(), black_box(&large)))
    });
}

criterion_group!(benches, bench_rewrite);
criterion_main!(benches);
