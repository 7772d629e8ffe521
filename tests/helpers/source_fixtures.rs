//! Common source code fixtures for tests.

// Pascal
pub const PASCAL_IF_ELSE: &str = "if x > 0 then y := 1 else y := 2";

pub const PASCAL_ROUTINES: &str = r#"program calls;
function foo(a, b: integer): integer;
begin
  foo := a + b
end;
procedure bar;
begin
  writeln('bar')
end;
begin
  foo(1, 2);
  bar();
  baz(1)
end.
"#;

pub const PASCAL_LOOPS: &str = r#"program loops;
begin
  i := 0;
  while i < 10 do
  begin
    i := i + 1
  end;
  repeat
    i := i - 1
  until i = 0
end.
"#;

pub const PASCAL_SYNTAX_ERROR: &str = r#"program broken;
begin
  x := 1;
  if x then then y := 2
end.
"#;

// ANSI C
pub const C_MAIN: &str = r#"#include <stdio.h>
int main() {
  int n = 3;
  while (n > 0) {
    printf("%d\n", n);
    n--;
  }
  return 0;
}
"#;

// Stored diagrams
pub const SBD_MAIN: &str = "{ main }{1, var, =, a, =, 10}";

pub const NSD_OLD_VERSION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root text="&#34;legacy&#34;" comment="" type="program" version="3.20">
  <children>
    <while text="&#34;while x &lt; 3&#34;">
      <qWhile><instruction text="&#34;OUTPUT x&#34;"/></qWhile>
    </while>
  </children>
</root>
"#;

pub const NSD_GERMAN_SNAPSHOT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root text="&#34;deutsch&#34;" comment="" type="program" version="3.30" preWhile="solange" input="EINGABE" output="AUSGABE">
  <children>
    <instruction text="&#34;EINGABE x&#34;"/>
    <while text="&#34;solange x &lt; 3&#34;">
      <qWhile><instruction text="&#34;AUSGABE x&#34;"/></qWhile>
    </while>
  </children>
</root>
"#;
